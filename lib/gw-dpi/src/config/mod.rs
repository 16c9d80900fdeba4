/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod size_limit;
pub use size_limit::ProtocolInspectionSizeLimit;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolInspectionConfig {
    size_limit: ProtocolInspectionSizeLimit,
}

impl ProtocolInspectionConfig {
    #[inline]
    pub fn size_limit(&self) -> &ProtocolInspectionSizeLimit {
        &self.size_limit
    }

    #[inline]
    pub fn size_limit_mut(&mut self) -> &mut ProtocolInspectionSizeLimit {
        &mut self.size_limit
    }
}
