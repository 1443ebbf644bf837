use std::path::PathBuf;

use clap::Parser;

use crate::palette::DisplayOptions;

/// Generate color palette images from natural-language prompts.
#[derive(Parser, Debug)]
#[command(name = "huesmith", version, about)]
pub struct Args {
    /// Natural-language description of the palette to generate
    pub prompt: Option<String>,

    /// Revise the palette given by --from with this instruction
    #[arg(short, long, requires = "from", conflicts_with = "prompt")]
    pub edit: Option<String>,

    /// Seed palette as "#RRGGBB (name), ..." pairs; rendered directly
    /// when no prompt or --edit is given
    #[arg(long)]
    pub from: Option<String>,

    /// Write the rendered PNG to this file
    #[arg(short, long, default_value = "palette.png")]
    pub output: PathBuf,

    /// Base URL of the palette generation backend
    #[arg(short, long)]
    pub backend_url: Option<String>,

    /// Opaque user token forwarded with every backend request
    #[arg(short, long, default_value = "")]
    pub token: String,

    /// TTF/OTF font for the text overlay (common system locations are
    /// probed when omitted)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Leave the hex codes off the image
    #[arg(long)]
    pub no_hex: bool,

    /// Leave the color names off the image
    #[arg(long)]
    pub no_names: bool,

    /// Launch the interactive TUI session
    #[arg(long)]
    pub tui: bool,
}

impl Args {
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            show_hex: !self.no_hex,
            show_name: !self.no_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_show_both_labels() {
        let args = Args::parse_from(["huesmith", "a stormy sea"]);
        let opts = args.display_options();
        assert!(opts.show_hex);
        assert!(opts.show_name);
        assert_eq!(args.output, PathBuf::from("palette.png"));
    }

    #[test]
    fn label_flags_invert_the_options() {
        let args = Args::parse_from(["huesmith", "x y z", "--no-hex", "--no-names"]);
        let opts = args.display_options();
        assert!(!opts.show_hex);
        assert!(!opts.show_name);
    }

    #[test]
    fn edit_requires_a_seed_palette() {
        assert!(Args::try_parse_from(["huesmith", "--edit", "warmer"]).is_err());
        assert!(Args::try_parse_from([
            "huesmith",
            "--edit",
            "warmer",
            "--from",
            "#FF0000 (Red), #0000FF (Blue)"
        ])
        .is_ok());
    }

    #[test]
    fn edit_conflicts_with_a_fresh_prompt() {
        assert!(Args::try_parse_from([
            "huesmith",
            "a fresh prompt",
            "--edit",
            "warmer",
            "--from",
            "#FF0000 (Red)"
        ])
        .is_err());
    }
}
