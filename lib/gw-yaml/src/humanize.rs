/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! Sizes and durations written the way people write them, e.g. `256KiB` or `1m30s`.

use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use humanize_rs::bytes::Bytes;
use yaml_rust::Yaml;

fn non_negative(value: i64) -> anyhow::Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("negative value {value} is not allowed"))
}

/// A byte size, integers are taken as plain bytes.
pub fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::Integer(i) => {
            let n = non_negative(*i)?;
            usize::try_from(n).context("byte size out of range")
        }
        Yaml::String(s) => s
            .parse::<Bytes>()
            .map(|b| b.size())
            .map_err(|e| anyhow!("invalid byte size {s}: {e}")),
        _ => Err(anyhow!("a byte size should be given as an integer or a string")),
    }
}

/// A duration, bare numbers are taken as seconds.
pub fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::Integer(i) => non_negative(*i).map(Duration::from_secs),
        Yaml::Real(s) => {
            let secs = s
                .parse::<f64>()
                .map_err(|e| anyhow!("invalid real value {s}: {e}"))?;
            Duration::try_from_secs_f64(secs).map_err(|e| anyhow!("invalid duration {s}: {e}"))
        }
        Yaml::String(s) => match humanize_rs::duration::parse(s) {
            Ok(d) => Ok(d),
            Err(ParseError::MissingUnit) => s
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| anyhow!("invalid duration {s}")),
            Err(e) => Err(anyhow!("invalid duration {s}: {e}")),
        },
        _ => Err(anyhow!(
            "a duration should be given as an integer, a real or a string"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_size() {
        let cases = [
            (Yaml::String("1K".to_string()), 1000),
            (Yaml::String("256KiB".to_string()), 256 * 1024),
            (Yaml::String("1MiB".to_string()), 1 << 20),
            (Yaml::Integer(4096), 4096),
        ];
        for (v, expected) in cases {
            assert_eq!(as_usize(&v).unwrap(), expected);
        }

        assert!(as_usize(&Yaml::Integer(-1)).is_err());
        assert!(as_usize(&Yaml::String("lots".to_string())).is_err());
        assert!(as_usize(&Yaml::Boolean(true)).is_err());
    }

    #[test]
    fn duration() {
        let v = Yaml::String("1h2m".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(3720));

        let v = Yaml::String("10s".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(10));

        let v = Yaml::String("90".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(90));

        let v = Yaml::Integer(5);
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(5));

        let v = Yaml::Real("0.25".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_millis(250));

        assert!(as_duration(&Yaml::Integer(-3)).is_err());
        assert!(as_duration(&Yaml::String("-1000h".to_string())).is_err());
        assert!(as_duration(&Yaml::Array(Vec::new())).is_err());
    }
}
