use rstest::rstest;
use spoke_config::{Comparator, load_file, load_toml};
use std::io::Write;

const BASE: &str = r#"
[[gauges]]
source_id = 0
clock_pin = 34
data_pin = 35

[[contacts]]
source_id = 6
pin = 13
"#;

fn with(extra: &str) -> String {
    format!("{BASE}\n{extra}")
}

#[test]
fn base_config_is_valid() {
    let cfg = load_toml(BASE).expect("parse TOML");
    cfg.validate().expect("valid");
    assert_eq!(cfg.source_ids(), [0, 6]);
    assert!(cfg.contacts[0].pull_up);
    assert!(!cfg.scale.enabled);
}

#[test]
fn full_reference_layout_is_valid() {
    let toml = r#"
[timing]
bit_timeout_ms = 100
packet_timeout_ms = 250
gauge_poll_ms = 50
contact_poll_ms = 10

[comparator]
mode = "analog"
threshold = 1100

[filter]
min_active_mm = 0.6
min_change_mm = 0.01
max_step_mm = 1.0

[[gauges]]
source_id = 0
clock_pin = 34
data_pin = 35

[[gauges]]
source_id = 1
clock_pin = 32
data_pin = 33

[[gauges]]
source_id = 2
clock_pin = 25
data_pin = 26

[[contacts]]
source_id = 6
pin = 13

[scale]
enabled = true

[queue]
capacity = 20

[logging]
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid");
    assert_eq!(cfg.source_ids(), [0, 1, 2, 6, 9]);
    assert_eq!(cfg.scale.manufacturer_id, 256);
    assert_eq!(cfg.scale.weight_offset, 32);
}

#[rstest]
#[case("[timing]\nbit_timeout_ms = 0", "timing.bit_timeout_ms must be >= 1")]
#[case("[timing]\npacket_timeout_ms = 0", "timing.packet_timeout_ms must be >= 1")]
#[case(
    "[timing]\nbit_timeout_ms = 300\npacket_timeout_ms = 250",
    "packet_timeout_ms must be >= timing.bit_timeout_ms"
)]
#[case("[filter]\nmin_change_mm = 1.0\nmax_step_mm = 1.0", "min_change_mm must be <")]
#[case("[filter]\nmin_active_mm = -0.1", "filter.min_active_mm must be finite")]
#[case("[filter]\nmax_step_mm = nan", "filter.max_step_mm must be finite")]
#[case("[queue]\ncapacity = 0", "queue.capacity must be >= 1")]
#[case("[comparator]\nmode = \"analog\"\nthreshold = 5000", "comparator.threshold")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation")]
#[case("[scale]\nenabled = true\nsource_id = 6", "source_id 6 is used by more than one sensor")]
#[case("[scale]\nenabled = true\nweight_offset = 1", "scale.weight_offset must be >= 2")]
#[case("[[contacts]]\nsource_id = 7\npin = 35", "pin 35 is assigned more than once")]
#[case("[simulation]\ncontact_period_steps = 2\ncontact_press_steps = 3", "contact_press_steps")]
fn rejects_invalid(#[case] extra: &str, #[case] needle: &str) {
    let cfg = load_toml(&with(extra)).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(format!("{err}").contains(needle), "{err} does not mention {needle}");
}

#[test]
fn duplicate_gauge_ids_are_rejected() {
    let toml = with("[[gauges]]\nsource_id = 0\nclock_pin = 32\ndata_pin = 33");
    let err = load_toml(&toml).expect("parse").validate().expect_err("duplicate");
    assert!(err.to_string().contains("source_id 0"));
}

#[test]
fn disabled_scale_does_not_claim_its_id() {
    let toml = with("[scale]\nenabled = false\nsource_id = 6");
    load_toml(&toml).expect("parse").validate().expect("valid");
}

#[test]
fn digital_comparator_ignores_threshold() {
    let cfg = load_toml(&with("[comparator]\nmode = \"digital-inverted\"")).expect("parse");
    assert_eq!(cfg.comparator, Comparator::DigitalInverted);
    cfg.validate().expect("valid");
}

#[test]
fn unknown_comparator_mode_fails_to_parse() {
    assert!(load_toml(&with("[comparator]\nmode = \"schmitt\"")).is_err());
}

#[test]
fn load_file_parses_and_validates() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(BASE.as_bytes()).expect("write");
    let cfg = load_file(f.path()).expect("load");
    assert_eq!(cfg.gauges.len(), 1);

    let mut bad = tempfile::NamedTempFile::new().expect("tempfile");
    bad.write_all(b"[queue]\ncapacity = 0\n").expect("write");
    assert!(load_file(bad.path()).is_err());
}

#[test]
fn missing_file_names_the_path() {
    let err = load_file("/definitely/not/here.toml").expect_err("missing");
    assert!(format!("{err:#}").contains("/definitely/not/here.toml"));
}
