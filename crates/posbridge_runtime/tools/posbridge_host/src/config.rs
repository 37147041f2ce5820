use std::env;
use std::time::Duration;

pub const DEFAULT_OWNER: &str = "posbridge_host";
pub const DEFAULT_PERIOD_MS: u64 = 1000;
pub const DEFAULT_FLOOR: &str = "L1";

pub struct Config {
    pub owner: String,
    pub period: Duration,
    pub floor: Option<String>,
    pub auto_listen: bool,
}

impl Config {
    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut owner =
            env::var("POSBRIDGE_OWNER").unwrap_or_else(|_| DEFAULT_OWNER.to_string());
        let mut period_ms = env::var("POSBRIDGE_SIM_PERIOD_MS")
            .ok()
            .and_then(parse_period)
            .unwrap_or(DEFAULT_PERIOD_MS);
        let mut floor = match env::var("POSBRIDGE_SIM_FLOOR") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value),
            Err(_) => Some(DEFAULT_FLOOR.to_string()),
        };
        let mut auto_listen = env::var("POSBRIDGE_AUTO_LISTEN")
            .ok()
            .and_then(parse_bool)
            .unwrap_or(true);

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                "--owner" => {
                    if let Some(value) = args.next() {
                        owner = value.as_ref().to_string();
                    }
                }
                "--period-ms" => {
                    if let Some(value) = args.next().and_then(|v| parse_period(v.as_ref())) {
                        period_ms = value;
                    }
                }
                "--floor" => {
                    if let Some(value) = args.next() {
                        floor = Some(value.as_ref().to_string());
                    }
                }
                "--no-floor" => {
                    floor = None;
                }
                "--no-listen" => {
                    auto_listen = false;
                }
                _ if arg.starts_with("--owner=") => {
                    owner = arg["--owner=".len()..].to_string();
                }
                _ if arg.starts_with("--period-ms=") => {
                    if let Some(value) = parse_period(&arg["--period-ms=".len()..]) {
                        period_ms = value;
                    }
                }
                _ if arg.starts_with("--floor=") => {
                    floor = Some(arg["--floor=".len()..].to_string());
                }
                _ => {}
            }
        }

        Self {
            owner,
            period: Duration::from_millis(period_ms),
            floor,
            auto_listen,
        }
    }
}

fn print_usage() {
    eprintln!(
        "posbridge_host [--owner <name>] [--period-ms <ms>] [--floor <code> | --no-floor] [--no-listen]"
    );
}

// Zero would make the simulated ticker spin.
fn parse_period(value: impl AsRef<str>) -> Option<u64> {
    value.as_ref().trim().parse().ok().filter(|ms| *ms > 0)
}

fn parse_bool(value: String) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
