use std::path::PathBuf;
use std::process::Command;

use huesmith::palette::{ColorEntry, DisplayOptions, Palette};
use huesmith::pipeline::parse::parse_palette;
use huesmith::pipeline::render::{band_bounds, encode_png, render_palette, HEIGHT, WIDTH};
use huesmith::session::{Session, MSG_NO_USABLE_PALETTE};

// ---------------------------------------------------------------------------
// Pipeline tests
// ---------------------------------------------------------------------------

const SAMPLE_REPLY: &str = "Here is a forest palette for you:\n\
                            1. #1B4332 (Pine)\n\
                            2. #52B788 (Moss)\n\
                            3. #D8F3DC (Mist)\n\
                            Hope you like it!";

#[test]
fn backend_reply_renders_into_three_bands() {
    let entries = parse_palette(SAMPLE_REPLY);
    assert_eq!(entries.len(), 3);
    let palette = Palette::new(entries);

    let options = DisplayOptions {
        show_hex: true,
        show_name: false,
    };
    let image = render_palette(&palette, options, None).unwrap();
    assert_eq!(image.dimensions(), (WIDTH, HEIGHT));

    let expected = [[0x1B, 0x43, 0x32], [0x52, 0xB7, 0x88], [0xD8, 0xF3, 0xDC]];
    for (index, want) in expected.iter().enumerate() {
        let (start, end) = band_bounds(index, 3);
        let x = (start + end) / 2;
        assert_eq!(image.get_pixel(x, HEIGHT / 2).0, *want, "band {index}");
    }
}

#[test]
fn session_flow_generate_then_unusable_reply() {
    let mut session = Session::new(DisplayOptions::default());
    assert!(session.begin_request());
    assert!(session.apply_response(SAMPLE_REPLY));
    let palette = session.palette().unwrap().clone();

    assert!(session.begin_request());
    assert!(!session.apply_response("The weather today is sunny."));
    assert_eq!(session.message.as_deref(), Some(MSG_NO_USABLE_PALETTE));
    assert_eq!(session.palette(), Some(&palette), "palette must survive");
}

#[test]
fn parsed_palette_encodes_to_decodable_png() {
    let palette = Palette::new(parse_palette(SAMPLE_REPLY));
    let image = render_palette(&palette, DisplayOptions::default(), None).unwrap();
    let bytes = encode_png(&image).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.width(), WIDTH);
    assert_eq!(decoded.height(), HEIGHT);
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

mod property_tests {
    use super::*;
    use huesmith::color::Color;
    use proptest::prelude::*;

    prop_compose! {
        /// Labels that survive a describe/parse round trip: anything but a
        /// closing paren or a line terminator.
        fn arb_label()(label in "[a-zA-Z0-9 _#(=-]{0,16}") -> String {
            label
        }
    }

    prop_compose! {
        fn arb_entry()(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), name in arb_label())
            -> ColorEntry {
            ColorEntry::new(Color::new(r, g, b), name)
        }
    }

    proptest! {
        #[test]
        fn bands_always_tile_the_canvas(count in 1usize..=256) {
            let mut total = 0;
            for index in 0..count {
                let (start, end) = band_bounds(index, count);
                prop_assert!(start <= end);
                if index > 0 {
                    prop_assert_eq!(band_bounds(index - 1, count).1, start);
                }
                total += end - start;
            }
            prop_assert_eq!(total, WIDTH);
        }

        #[test]
        fn describe_and_parse_round_trip(entries in proptest::collection::vec(arb_entry(), 1..8)) {
            let palette = Palette::new(entries.clone());
            let parsed = parse_palette(&palette.describe());
            prop_assert_eq!(parsed, entries);
        }

        #[test]
        fn parser_never_panics_and_labels_stay_on_one_line(text in ".{0,200}") {
            for entry in parse_palette(&text) {
                prop_assert!(!entry.name.contains(')'));
                prop_assert!(!entry.name.contains('\n'));
                prop_assert!(!entry.name.contains('\r'));
            }
        }

        #[test]
        fn every_band_midpoint_shows_its_color(
            entries in proptest::collection::vec(arb_entry(), 1..16)
        ) {
            let palette = Palette::new(entries.clone());
            let options = DisplayOptions { show_hex: false, show_name: false };
            let image = render_palette(&palette, options, None).unwrap();
            for (index, entry) in entries.iter().enumerate() {
                let (start, end) = band_bounds(index, entries.len());
                let x = (start + end) / 2;
                let c = entry.color;
                prop_assert_eq!(image.get_pixel(x, HEIGHT / 2).0, [c.r, c.g, c.b]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CLI integration tests (run the actual binary)
// ---------------------------------------------------------------------------

fn cargo_bin() -> PathBuf {
    // Build the binary in test mode and return its path
    let output = Command::new("cargo")
        .args(["build", "--quiet"])
        .output()
        .expect("failed to build binary");
    assert!(output.status.success(), "cargo build failed");

    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("debug")
        .join("huesmith")
}

#[test]
fn cli_renders_a_seed_palette_offline() {
    let bin = cargo_bin();
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("palette.png");

    let output = Command::new(&bin)
        .args([
            "--from",
            "#FF0000 (Red), #00FF00 (Green), #0000FF (Blue)",
            "--output",
            out_path.to_str().unwrap(),
            "--no-hex",
            "--no-names",
        ])
        .output()
        .expect("failed to run binary");

    assert!(
        output.status.success(),
        "binary exited with error: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let image = image::open(&out_path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (WIDTH, HEIGHT));
    assert_eq!(image.get_pixel(WIDTH / 6, HEIGHT / 2).0, [255, 0, 0]);
    assert_eq!(image.get_pixel(WIDTH / 2, HEIGHT / 2).0, [0, 255, 0]);
    assert_eq!(image.get_pixel(WIDTH - 10, HEIGHT / 2).0, [0, 0, 255]);
}

#[test]
fn cli_rejects_an_unparsable_seed() {
    let bin = cargo_bin();
    let output = Command::new(&bin)
        .args(["--from", "just words, no colors"])
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("#RRGGBB"),
        "expected a seed-format error, got: {stderr}"
    );
}

#[test]
fn cli_requires_something_to_do() {
    let bin = cargo_bin();
    let output = Command::new(&bin)
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nothing to do"), "got: {stderr}");
}

#[test]
fn cli_generate_without_backend_url_fails_cleanly() {
    let bin = cargo_bin();
    let output = Command::new(&bin)
        .arg("a warm autumn palette")
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--backend-url"), "got: {stderr}");
}

#[test]
fn cli_generate_against_unreachable_backend_reports_service_unavailable() {
    let bin = cargo_bin();
    // Port 9 (discard) is a safe dead end; the request fails fast and the
    // user sees the retry message, not a panic or backtrace.
    let output = Command::new(&bin)
        .args([
            "a warm autumn palette",
            "--backend-url",
            "http://127.0.0.1:9",
        ])
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unavailable"),
        "expected the service-unavailable message, got: {stderr}"
    );
}

#[test]
fn cli_help_output() {
    let bin = cargo_bin();
    let output = Command::new(&bin)
        .arg("--help")
        .output()
        .expect("failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("huesmith"));
    assert!(stdout.contains("--from"));
    assert!(stdout.contains("--edit"));
    assert!(stdout.contains("--backend-url"));
    assert!(stdout.contains("--no-hex"));
    assert!(stdout.contains("--tui"));
}
