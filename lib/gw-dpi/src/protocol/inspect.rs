/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

use gw_http::HttpConnectRequest;

use super::{MaybeProtocol, Protocol};
use crate::{ProtocolInspectionConfig, ProtocolInspectionSizeLimit};

const DEFAULT_CHECK_ORDER: &[MaybeProtocol] = &[MaybeProtocol::Http, MaybeProtocol::Socks];

#[derive(Debug, PartialEq, Eq)]
pub enum ProtocolInspectError {
    /// At least this many more bytes are needed before a decision can be made.
    NeedMoreData(usize),
}

/// The overall classification of the bytes received so far.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InspectVerdict {
    Success(Protocol),
    Failed,
    Uncertain,
}

pub(crate) struct ProtocolInspectState {
    current: Option<MaybeProtocol>,
    excluded: FixedBitSet,
    pub(super) http_scan_offset: usize,
    pub(super) http_connect_request: Option<HttpConnectRequest>,
}

impl Default for ProtocolInspectState {
    fn default() -> Self {
        ProtocolInspectState {
            current: None,
            excluded: FixedBitSet::with_capacity(MaybeProtocol::_MaxSize as usize),
            http_scan_offset: 0,
            http_connect_request: None,
        }
    }
}

impl ProtocolInspectState {
    pub(crate) fn exclude_other(&mut self, protocol: MaybeProtocol) {
        self.excluded.insert(protocol as usize);
    }

    fn excluded(&self, protocol: MaybeProtocol) -> bool {
        self.excluded.contains(protocol as usize)
    }

    pub(crate) fn exclude_current(&mut self) {
        if let Some(p) = self.current.take() {
            self.excluded.insert(p as usize);
        }
    }

    fn check_client_initial_data_for_protocol(
        &mut self,
        proto: MaybeProtocol,
        data: &[u8],
        size_limit: &ProtocolInspectionSizeLimit,
    ) -> Result<Option<Protocol>, ProtocolInspectError> {
        if self.excluded(proto) {
            return Ok(None);
        }
        self.current = Some(proto);
        let r = match proto {
            MaybeProtocol::Http => self.check_http_connect_request(data, size_limit),
            MaybeProtocol::Socks => self.check_socks_client_greeting(data),
            MaybeProtocol::_MaxSize => unreachable!(),
        };
        self.current = None;
        r
    }
}

/// Run the detectors in priority order and reduce their answers to one.
///
/// The first detector to succeed wins. If none succeeds but some need more data, the
/// smallest amount asked for is returned. `Ok(Protocol::Unknown)` means all detectors
/// have failed.
pub(super) fn inspect_in_order<F>(
    order: &[MaybeProtocol],
    mut check: F,
) -> Result<Protocol, ProtocolInspectError>
where
    F: FnMut(MaybeProtocol) -> Result<Option<Protocol>, ProtocolInspectError>,
{
    let mut pending_len: Option<usize> = None;
    for proto in order {
        match check(*proto) {
            Ok(Some(p)) => return Ok(p),
            Ok(None) => {}
            Err(ProtocolInspectError::NeedMoreData(len)) => {
                pending_len = Some(pending_len.map_or(len, |v| v.min(len)));
            }
        }
    }
    match pending_len {
        Some(len) => Err(ProtocolInspectError::NeedMoreData(len)),
        None => Ok(Protocol::Unknown),
    }
}

/// Classify the first bytes sent by a proxy client.
///
/// The same inspector should be fed with the whole accumulated data each time, as the
/// detectors keep their scan position between calls.
pub struct ProtocolInspector {
    state: ProtocolInspectState,
    check_order: SmallVec<[MaybeProtocol; 4]>,
    detected: Option<Protocol>,
}

impl Default for ProtocolInspector {
    fn default() -> Self {
        ProtocolInspector::with_check_order(DEFAULT_CHECK_ORDER)
    }
}

impl ProtocolInspector {
    pub fn with_check_order(order: &[MaybeProtocol]) -> Self {
        ProtocolInspector {
            state: ProtocolInspectState::default(),
            check_order: SmallVec::from_slice(order),
            detected: None,
        }
    }

    pub fn is_excluded(&self, protocol: MaybeProtocol) -> bool {
        self.state.excluded(protocol)
    }

    pub fn check_client_initial_data(
        &mut self,
        config: &ProtocolInspectionConfig,
        data: &[u8],
    ) -> Result<Protocol, ProtocolInspectError> {
        if let Some(p) = self.detected {
            return Ok(p);
        }

        let state = &mut self.state;
        let p = inspect_in_order(&self.check_order, |proto| {
            state.check_client_initial_data_for_protocol(proto, data, config.size_limit())
        })?;
        if p != Protocol::Unknown {
            self.detected = Some(p);
        }
        Ok(p)
    }

    pub fn classify(&mut self, config: &ProtocolInspectionConfig, data: &[u8]) -> InspectVerdict {
        match self.check_client_initial_data(config, data) {
            Ok(Protocol::Unknown) => InspectVerdict::Failed,
            Ok(p) => InspectVerdict::Success(p),
            Err(ProtocolInspectError::NeedMoreData(_)) => InspectVerdict::Uncertain,
        }
    }

    /// The parsed request head, available once `HttpConnect` has been detected.
    pub fn take_http_connect_request(&mut self) -> Option<HttpConnectRequest> {
        self.state.http_connect_request.take()
    }
}
