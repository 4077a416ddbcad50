use std::{env, str::FromStr, time::Duration};

pub fn get_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn get_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn get_parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key).map(|value| value.trim().parse::<T>()) {
        Ok(Ok(value)) => value,
        _ => default,
    }
}

pub fn get_seconds(key: &str, default: u64) -> Duration {
    match env::var(key).map(|value| value.trim().parse::<u64>()) {
        Ok(Ok(seconds)) if seconds > 0 => Duration::from_secs(seconds),
        _ => Duration::from_secs(default),
    }
}
