/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt::{self, Arguments};

use slog::{KV, Key, OwnedKVList, Record, Serializer};

use gw_types::log::AsyncLogFormatter;

use super::StdLogValue;

pub struct StdLogFormatter {
    append_code_position: bool,
}

impl StdLogFormatter {
    pub(crate) fn new(append_code_position: bool) -> Self {
        StdLogFormatter {
            append_code_position,
        }
    }
}

impl AsyncLogFormatter<StdLogValue> for StdLogFormatter {
    fn format_slog(
        &self,
        record: &Record,
        logger_values: &OwnedKVList,
    ) -> Result<StdLogValue, slog::Error> {
        let mut kv_formatter = KvFormatter::default();
        logger_values.serialize(record, &mut kv_formatter)?;
        record.kv().serialize(record, &mut kv_formatter)?;

        let location = if self.append_code_position {
            Some(format!("{}:{}", record.file(), record.line()))
        } else {
            None
        };

        Ok(StdLogValue {
            level: record.level(),
            message: record.msg().to_string(),
            kv_pairs: kv_formatter.kv_pairs,
            location,
        })
    }
}

#[derive(Default)]
struct KvFormatter {
    kv_pairs: Vec<(String, String)>,
}

impl Serializer for KvFormatter {
    fn emit_arguments(&mut self, key: Key, val: &Arguments<'_>) -> slog::Result {
        self.kv_pairs.push((key.to_string(), fmt::format(*val)));
        Ok(())
    }

    fn emit_str(&mut self, key: Key, val: &str) -> slog::Result {
        self.kv_pairs.push((key.to_string(), val.to_string()));
        Ok(())
    }
}
