use std::io::Write;

use fixed_presale::config::{self, ConfigError};
use fixed_presale::{Address, PresaleError, NATIVE_UNIT};

const RECEIVER: &str = "0x00000000000000000000000000000000000000a1";
const CUSTODY: &str = "0x00000000000000000000000000000000000000cc";

fn write_file(suffix: &str, body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    f.write_all(body.as_bytes()).unwrap();
    f
}

// Single test so the environment override cannot leak into parallel cases.
#[test]
fn file_then_environment_layers() {
    let toml = write_file(
        ".toml",
        &format!(
            r#"
[sale]
opening_time = 1700000000
closing_time = 1700000090
receiver = "{RECEIVER}"
custody = "{CUSTODY}"

[telemetry]
log_filter = "debug"
"#
        ),
    );

    let cfg = config::load(Some(toml.path())).unwrap();
    assert_eq!(cfg.sale.rate, 950_000);
    assert_eq!(cfg.sale.per_address_max, NATIVE_UNIT);
    assert_eq!(cfg.sale.hard_cap, 10 * NATIVE_UNIT);
    assert_eq!(cfg.sale.receiver, RECEIVER.parse::<Address>().unwrap());
    assert_eq!(cfg.sale.owner, None);
    assert_eq!(cfg.telemetry.log_filter, "debug");

    let json = write_file(
        ".json",
        &format!(
            r#"{{"sale": {{"rate": 2, "opening_time": 10, "closing_time": 20,
                 "per_address_max": "5", "hard_cap": 50,
                 "receiver": "{RECEIVER}", "custody": "{CUSTODY}", "owner": "{RECEIVER}"}}}}"#
        ),
    );
    let cfg = config::load(Some(json.path())).unwrap();
    assert_eq!(cfg.sale.rate, 2);
    assert_eq!(cfg.sale.per_address_max, 5);
    assert_eq!(cfg.sale.hard_cap, 50);
    assert_eq!(cfg.sale.owner, Some(RECEIVER.parse().unwrap()));

    // beyond u64: only representable as a string
    std::env::set_var("PRESALE__SALE__HARD_CAP", "20000000000000000000");
    let cfg = config::load(Some(toml.path())).unwrap();
    assert_eq!(cfg.sale.hard_cap, 20 * NATIVE_UNIT);

    std::env::set_var("PRESALE__SALE__CLOSING_TIME", "1700000000");
    let err = config::load(Some(toml.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(PresaleError::InvalidParams(_))));

    std::env::remove_var("PRESALE__SALE__HARD_CAP");
    std::env::remove_var("PRESALE__SALE__CLOSING_TIME");
}
