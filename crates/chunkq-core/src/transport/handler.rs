//! Easy2 Handler for one chunk POST: collects the response body in memory.

/// Handler state for one chunk transfer.
#[derive(Debug, Default)]
pub struct ResponseCollector {
    pub(super) body: Vec<u8>,
}

impl curl::easy::Handler for ResponseCollector {
    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
