//! Authenticator and voting-strategy selection.

use tracing::debug;

use crate::error::{ActionError, Result};
use crate::model::Selection;
use crate::registry::{PrimitiveKind, SupportRegistry};

/// Pick the authenticator and strategies an action is submitted with.
///
/// The authenticator is the first supported id in list order. Strategies are
/// returned as the positions of every supported id, ascending, because
/// signing refers to them by index into the original list.
///
/// Fails with a single unsupported-space error when either half comes up
/// empty; callers cannot tell which one did.
pub fn select_authenticator_and_strategies(
    registry: &dyn SupportRegistry,
    authenticators: &[String],
    strategies: &[String],
) -> Result<Selection> {
    let authenticator = authenticators
        .iter()
        .find(|id| registry.is_supported(PrimitiveKind::Authenticator, id));

    let selected: Vec<usize> = strategies
        .iter()
        .enumerate()
        .filter(|(_, id)| registry.is_supported(PrimitiveKind::Strategy, id))
        .map(|(index, _)| index)
        .collect();

    match authenticator {
        Some(authenticator) if !selected.is_empty() => {
            debug!(
                authenticator = %authenticator,
                strategies = ?selected,
                "Selected authenticator and strategies"
            );
            Ok(Selection {
                authenticator: authenticator.clone(),
                strategies: selected,
            })
        }
        _ => Err(ActionError::unsupported("unsupported space")),
    }
}
