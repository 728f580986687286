//! Executor resolution.
//!
//! A space may list several executors. Zodiac can actually run transactions,
//! so it always wins over Vanilla, whatever order the space lists them in.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::ExecutionEncoder;
use crate::error::{ActionError, Result};
use crate::model::{ExecutionPayload, MetaTransaction, Space};

/// Starknet id of the no-op executor.
pub const VANILLA_EXECUTOR: &str =
    "0x4ecc83848a519cc22b0d0ffb70e65ec8dde85d3d13439eff7145d4063cf6b4d";
/// Starknet id of the Zodiac module executor.
pub const ZODIAC_EXECUTOR: &str =
    "0x21dda40770f4317582251cffd5a0202d6b223dc167e5c8db25dc887d11eba81";

/// Executor families the resolver can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    Zodiac,
    Vanilla,
}

/// Resolution order, highest priority first.
const PRIORITY: [ExecutorKind; 2] = [ExecutorKind::Zodiac, ExecutorKind::Vanilla];

/// Deployment ids of the executors the resolver knows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutorIds {
    pub zodiac: String,
    pub vanilla: String,
}

impl Default for ExecutorIds {
    fn default() -> Self {
        Self {
            zodiac: ZODIAC_EXECUTOR.to_string(),
            vanilla: VANILLA_EXECUTOR.to_string(),
        }
    }
}

impl ExecutorIds {
    pub fn id(&self, kind: ExecutorKind) -> &str {
        match kind {
            ExecutorKind::Zodiac => &self.zodiac,
            ExecutorKind::Vanilla => &self.vanilla,
        }
    }
}

/// Picks the executor for a space and builds its payload.
#[derive(Clone)]
pub struct ExecutorResolver {
    ids: ExecutorIds,
    encoder: Arc<dyn ExecutionEncoder>,
}

impl ExecutorResolver {
    pub fn new(ids: ExecutorIds, encoder: Arc<dyn ExecutionEncoder>) -> Self {
        Self { ids, encoder }
    }

    pub fn resolve(
        &self,
        space: &Space,
        transactions: &[MetaTransaction],
    ) -> Result<ExecutionPayload> {
        let kind = PRIORITY
            .into_iter()
            .find(|kind| {
                let id = self.ids.id(*kind);
                space.executors.iter().any(|executor| executor == id)
            })
            .ok_or_else(|| ActionError::unsupported("no supported executor configured"))?;

        let executor = self.ids.id(kind).to_string();
        debug!(space = %space.id, executor = %executor, kind = ?kind, "Resolved executor");

        match kind {
            ExecutorKind::Zodiac => {
                let execution_params = self.encoder.encode(&executor, transactions)?;
                Ok(ExecutionPayload::Zodiac {
                    executor,
                    execution_params,
                })
            }
            ExecutorKind::Vanilla => {
                if !transactions.is_empty() {
                    warn!(
                        space = %space.id,
                        count = transactions.len(),
                        "Transactions will be ignored as vanilla executor is used"
                    );
                }
                Ok(ExecutionPayload::Vanilla { executor })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{normalize, EncodingError};
    use crate::model::Transaction;
    use alloy_primitives::{Address, Bytes, U256};

    struct FixedEncoder;

    impl ExecutionEncoder for FixedEncoder {
        fn encode(
            &self,
            executor: &str,
            transactions: &[MetaTransaction],
        ) -> std::result::Result<Vec<String>, EncodingError> {
            Ok(vec![executor.to_string(), transactions.len().to_string()])
        }
    }

    struct FailingEncoder;

    impl ExecutionEncoder for FailingEncoder {
        fn encode(
            &self,
            executor: &str,
            _transactions: &[MetaTransaction],
        ) -> std::result::Result<Vec<String>, EncodingError> {
            Err(EncodingError::UnknownNetwork(executor.to_string()))
        }
    }

    fn resolver() -> ExecutorResolver {
        ExecutorResolver::new(ExecutorIds::default(), Arc::new(FixedEncoder))
    }

    fn txs(count: usize) -> Vec<MetaTransaction> {
        let source: Vec<Transaction> = (0..count)
            .map(|i| Transaction::new(Address::ZERO, U256::from(i), Bytes::new()))
            .collect();
        normalize(&source)
    }

    #[test]
    fn test_zodiac_only() {
        let space = Space::new("0x1").with_executors([ZODIAC_EXECUTOR]);
        let payload = resolver().resolve(&space, &txs(2)).unwrap();
        assert_eq!(
            payload,
            ExecutionPayload::Zodiac {
                executor: ZODIAC_EXECUTOR.to_string(),
                execution_params: vec![ZODIAC_EXECUTOR.to_string(), "2".to_string()],
            }
        );
    }

    #[test]
    fn test_zodiac_preferred_regardless_of_position() {
        let first = Space::new("0x1").with_executors([ZODIAC_EXECUTOR, VANILLA_EXECUTOR]);
        let last = Space::new("0x1").with_executors([VANILLA_EXECUTOR, "0xdead", ZODIAC_EXECUTOR]);

        assert!(resolver().resolve(&first, &txs(1)).unwrap().is_zodiac());
        assert!(resolver().resolve(&last, &txs(1)).unwrap().is_zodiac());
    }

    #[test]
    fn test_vanilla_ignores_transactions() {
        let space = Space::new("0x1").with_executors([VANILLA_EXECUTOR]);

        for count in [0, 3] {
            let payload = resolver().resolve(&space, &txs(count)).unwrap();
            assert_eq!(
                payload,
                ExecutionPayload::Vanilla {
                    executor: VANILLA_EXECUTOR.to_string()
                }
            );
            assert!(payload.execution_params().is_empty());
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_warnings(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_vanilla_with_transactions_warns() {
        let space = Space::new("0x1").with_executors([VANILLA_EXECUTOR]);

        let logs = captured_warnings(|| {
            resolver().resolve(&space, &txs(3)).unwrap();
        });
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Transactions will be ignored as vanilla executor is used"));
        assert!(logs.contains("count=3"));
    }

    #[test]
    fn test_vanilla_without_transactions_is_silent() {
        let space = Space::new("0x1").with_executors([VANILLA_EXECUTOR]);

        let logs = captured_warnings(|| {
            resolver().resolve(&space, &[]).unwrap();
        });
        assert!(logs.is_empty());
    }

    #[test]
    fn test_no_supported_executor() {
        for executors in [vec![], vec!["0xdead".to_string(), "0xbeef".to_string()]] {
            let space = Space::new("0x1").with_executors(executors);
            let err = resolver().resolve(&space, &txs(1)).unwrap_err();
            assert!(err.is_unsupported_space());
        }
    }

    #[test]
    fn test_encoder_failure_surfaces() {
        let resolver = ExecutorResolver::new(ExecutorIds::default(), Arc::new(FailingEncoder));
        let space = Space::new("0x1").with_executors([ZODIAC_EXECUTOR]);
        let err = resolver.resolve(&space, &txs(1)).unwrap_err();
        assert!(matches!(err, ActionError::Encoding(EncodingError::UnknownNetwork(_))));
    }

    #[test]
    fn test_custom_ids() {
        let ids = ExecutorIds {
            zodiac: "0xz".to_string(),
            vanilla: "0xv".to_string(),
        };
        let resolver = ExecutorResolver::new(ids, Arc::new(FixedEncoder));

        let space = Space::new("0x1").with_executors([VANILLA_EXECUTOR, "0xv"]);
        let payload = resolver.resolve(&space, &[]).unwrap();
        assert_eq!(payload.executor(), "0xv");
    }
}
