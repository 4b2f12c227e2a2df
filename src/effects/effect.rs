//! Effect definitions and invocations.
//!
//! An `EffectDefinition` is a compiled `effect { ... }` block: a name,
//! typed parameters and a checked action body. An `EffectInvocation` is
//! what a card carries in `OnActivation`: the definition it calls, the
//! argument expressions for its parameters, how targets are selected and
//! an optional follow-up invocation.

use serde::{Deserialize, Serialize};

use super::targeting::Selector;
use crate::script::ast::{Body, Expr};
use crate::script::types::ValueKind;

/// A declared effect parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub kind: ValueKind,
}

/// A compiled effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDefinition {
    pub name: String,

    /// Parameters in declaration order.
    pub params: Vec<Param>,

    /// Name the action binds the selected targets to.
    pub targets: String,

    /// Name the action binds the game context to.
    pub context: String,

    /// Type-checked action statements.
    pub body: Body,
}

impl EffectDefinition {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        targets: impl Into<String>,
        context: impl Into<String>,
        body: Body,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            targets: targets.into(),
            context: context.into(),
            body,
        }
    }

    /// Add a parameter (builder pattern).
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind,
        });
        self
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Names and kinds visible at the top of the action body.
    pub fn bindings(&self) -> impl Iterator<Item = (String, ValueKind)> + '_ {
        [
            (self.targets.clone(), ValueKind::CardCollection),
            (self.context.clone(), ValueKind::Context),
        ]
        .into_iter()
        .chain(self.params.iter().map(|p| (p.name.clone(), p.kind)))
    }
}

/// An argument expression bound to a parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: Expr,
}

/// One entry of a card's `OnActivation` list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectInvocation {
    pub effect: EffectDefinition,

    /// One argument per parameter, in parameter order.
    pub args: Vec<Argument>,

    /// How targets are chosen. `None` means the parent's targets, or no
    /// targets at the top level.
    pub selector: Option<Selector>,

    /// Runs after this invocation, against its targets.
    pub post_action: Option<Box<EffectInvocation>>,
}

impl EffectInvocation {
    #[must_use]
    pub fn new(effect: EffectDefinition) -> Self {
        Self {
            effect,
            args: Vec::new(),
            selector: None,
            post_action: None,
        }
    }

    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.args.push(Argument {
            name: name.into(),
            value,
        });
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    #[must_use]
    pub fn with_post_action(mut self, post_action: EffectInvocation) -> Self {
        self.post_action = Some(Box::new(post_action));
        self
    }

    /// Name of the invoked effect.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.effect.name
    }
}
