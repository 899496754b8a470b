//! Vanilla option argument bundle.

use crate::exercise::Exercise;
use crate::payoff::StrikedPayoff;
use std::rc::Rc;

/// Arguments describing a vanilla option to a pricing engine.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// The option payoff (strike + call/put).
    pub payoff: Rc<dyn StrikedPayoff>,
    /// When the option can be exercised.
    pub exercise: Exercise,
}
