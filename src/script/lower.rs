//! Semantic lowering: block ASTs to compiled effects and cards.
//!
//! Effects are lowered first and registered in an `EffectTable`, then each
//! card block is checked against the table. A block that produced any
//! diagnostic of its own is dropped from the output, but its name stays
//! known: an effect that failed to compile is registered as broken so the
//! cards that use it get one clear diagnostic instead of "unknown effect".

use rustc_hash::{FxHashMap, FxHashSet};

use super::ast::{
    CardBlock, EffectBlock, Expr, Header, InvocationBlock, Literal, SelectorBlock, Spanned,
};
use super::checker::Checker;
use super::diagnostics::Diagnostics;
use super::lexer::Position;
use super::types::ValueKind;
use crate::cards::{CardDefinition, CardId, CardType, Faction, Range, Ranges};
use crate::effects::{Argument, EffectDefinition, EffectInvocation, Selector, Source};

#[derive(Clone, Debug)]
enum EffectEntry {
    Ready(EffectDefinition),
    Broken,
}

/// Effects known to one compile, by name.
#[derive(Clone, Debug, Default)]
pub(crate) struct EffectTable {
    entries: FxHashMap<String, EffectEntry>,
}

impl EffectTable {
    fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&EffectEntry> {
        self.entries.get(name)
    }

    fn insert(&mut self, name: String, entry: EffectEntry) {
        self.entries.insert(name, entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// State carried across the blocks of one compile.
#[derive(Debug, Default)]
pub(crate) struct Lowering {
    effects: EffectTable,
    card_names: FxHashSet<String>,
    next_card: u32,
}

impl Lowering {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn effects(&self) -> &EffectTable {
        &self.effects
    }

    // === effect ===

    /// Check an effect block and register it under its name.
    ///
    /// `faulted` marks a block that already has diagnostics from an earlier
    /// stage.
    pub(crate) fn lower_effect(
        &mut self,
        block: EffectBlock,
        faulted: bool,
        diagnostics: &mut Diagnostics,
    ) {
        let mark = diagnostics.mark();
        let position = block.position;

        let name = match block.name {
            Header::Given(name) => Some(name),
            Header::Missing => {
                diagnostics.semantic(position, "effect is missing `Name`");
                None
            }
            Header::Malformed(_) => None,
        };
        let duplicate = match &name {
            Some(name) if self.effects.contains(&name.node) => {
                diagnostics.semantic(
                    name.position,
                    format!("effect `{}` is already defined", name.node),
                );
                true
            }
            _ => false,
        };
        let label = name.as_ref().map_or("<unnamed>", |n| n.node.as_str());

        let mut params = Vec::new();
        for decl in block.params {
            if params.iter().any(|(existing, _): &(String, ValueKind)| *existing == decl.name) {
                diagnostics.semantic(
                    decl.position,
                    format!("parameter `{}` is declared twice", decl.name),
                );
                continue;
            }
            match ValueKind::from_param_type(&decl.type_name) {
                Some(kind) => params.push((decl.name, kind)),
                None => diagnostics.semantic(
                    decl.position,
                    format!(
                        "unknown type `{}` for parameter `{}`",
                        decl.type_name, decl.name
                    ),
                ),
            }
        }

        let definition = match block.action {
            Some(mut action) => {
                let mut definition =
                    EffectDefinition::new(label, action.targets.clone(), action.context.clone(), Vec::new());
                for (param, kind) in params {
                    definition = definition.with_param(param, kind);
                }
                Checker::with_bindings(diagnostics, definition.bindings()).check_body(&mut action.body);
                definition.body = action.body;
                Some(definition)
            }
            None => {
                diagnostics.semantic(position, format!("effect `{}` is missing `Action`", label));
                None
            }
        };

        let clean = !block.recovered && !faulted && !diagnostics.has_errors_since(mark);
        let Some(name) = name else {
            return;
        };
        if duplicate {
            return;
        }
        let entry = match definition {
            Some(definition) if clean => {
                log::debug!("compiled effect `{}`", name.node);
                EffectEntry::Ready(definition)
            }
            _ => {
                log::debug!("effect `{}` has errors", name.node);
                EffectEntry::Broken
            }
        };
        self.effects.insert(name.node, entry);
    }

    // === card ===

    /// Check a card block; returns the compiled card when it is clean.
    pub(crate) fn lower_card(
        &mut self,
        block: CardBlock,
        faulted: bool,
        diagnostics: &mut Diagnostics,
    ) -> Option<CardDefinition> {
        let mark = diagnostics.mark();
        let position = block.position;

        let name = match &block.name {
            Header::Given(name) => {
                if !self.card_names.insert(name.node.clone()) {
                    diagnostics.semantic(
                        name.position,
                        format!("card `{}` is already defined", name.node),
                    );
                }
                Some(name.node.clone())
            }
            Header::Missing => {
                diagnostics.semantic(position, "card is missing `Name`");
                None
            }
            Header::Malformed(_) => None,
        };
        let label = name.clone().unwrap_or_else(|| "<unnamed>".to_string());

        let card_type = header_enum(
            &block.card_type,
            "Type",
            "card type",
            &label,
            position,
            CardType::from_name,
            diagnostics,
        );
        let faction = header_enum(
            &block.faction,
            "Faction",
            "faction",
            &label,
            position,
            Faction::from_name,
            diagnostics,
        );
        let power = block.power.given().map_or(0, |p| p.node);
        let description = block
            .description
            .given()
            .map(|d| d.node.clone())
            .unwrap_or_default();

        let ranges = match &block.range {
            Header::Given(list) => lower_ranges(&list.node, diagnostics),
            _ => Ranges::new(),
        };
        let range_malformed = block.range.is_malformed();
        if let Some(card_type) = card_type {
            if card_type.is_unit() && ranges.is_empty() && !range_malformed {
                diagnostics.semantic(
                    position,
                    format!("unit card `{}` needs at least one range", label),
                );
            }
        }

        let mut invocations = Vec::new();
        for invocation in block.on_activation {
            if let Some(invocation) = self.lower_invocation(invocation, false, diagnostics) {
                invocations.push(invocation);
            }
        }

        let clean = !block.recovered && !faulted && !diagnostics.has_errors_since(mark);
        if !clean {
            log::debug!("card `{}` has errors", label);
            return None;
        }
        let (name, card_type, faction) = (name?, card_type?, faction?);

        let id = CardId::new(self.next_card);
        self.next_card += 1;
        log::debug!("compiled card `{}` as {}", name, id);
        let mut card = CardDefinition::new(id, name, card_type, faction)
            .with_power(power)
            .with_description(description);
        card.ranges = ranges;
        Some(invocations.into_iter().fold(card, CardDefinition::with_effect))
    }

    // === invocations ===

    fn lower_invocation(
        &mut self,
        block: InvocationBlock,
        in_post_action: bool,
        diagnostics: &mut Diagnostics,
    ) -> Option<EffectInvocation> {
        let mark = diagnostics.mark();

        let effect = match &block.effect {
            None => {
                diagnostics.semantic(block.position, "invocation is missing `Effect`");
                None
            }
            Some(name) => match self.effects.get(&name.node) {
                Some(EffectEntry::Ready(definition)) => Some(definition.clone()),
                Some(EffectEntry::Broken) => {
                    diagnostics.semantic(
                        name.position,
                        format!("effect `{}` failed to compile", name.node),
                    );
                    None
                }
                None => {
                    diagnostics.semantic(name.position, format!("unknown effect `{}`", name.node));
                    None
                }
            },
        };

        let args = lower_args(effect.as_ref(), block.args, block.position, diagnostics);
        let selector = block
            .selector
            .map(|selector| lower_selector(selector, in_post_action, diagnostics));
        let post_action = block
            .post_action
            .map(|post_action| self.lower_invocation(*post_action, true, diagnostics));

        if diagnostics.has_errors_since(mark) {
            return None;
        }
        let mut invocation = EffectInvocation::new(effect?);
        invocation.args = args;
        if let Some(selector) = selector.flatten() {
            invocation = invocation.with_selector(selector);
        }
        if let Some(post_action) = post_action.flatten() {
            invocation = invocation.with_post_action(post_action);
        }
        Some(invocation)
    }
}

/// Resolve a required enum-valued header (`Type`, `Faction`).
#[allow(clippy::too_many_arguments)]
fn header_enum<T>(
    header: &Header<String>,
    field: &str,
    what: &str,
    card: &str,
    position: Position,
    parse: impl Fn(&str) -> Option<T>,
    diagnostics: &mut Diagnostics,
) -> Option<T> {
    match header {
        Header::Given(value) => {
            let parsed = parse(&value.node);
            if parsed.is_none() {
                diagnostics.semantic(value.position, format!("unknown {} `{}`", what, value.node));
            }
            parsed
        }
        Header::Missing => {
            diagnostics.semantic(position, format!("card `{}` is missing `{}`", card, field));
            None
        }
        Header::Malformed(_) => None,
    }
}

fn lower_ranges(names: &[Spanned<String>], diagnostics: &mut Diagnostics) -> Ranges {
    let mut ranges = Ranges::new();
    for name in names {
        match Range::from_name(&name.node) {
            Some(range) if ranges.contains(&range) => {
                diagnostics.semantic(
                    name.position,
                    format!("range `{}` is listed twice", name.node),
                );
            }
            Some(range) => ranges.push(range),
            None => diagnostics.semantic(name.position, format!("unknown range `{}`", name.node)),
        }
    }
    ranges
}

/// Type-check argument expressions and order them by parameter.
///
/// Arguments see no variables.
fn lower_args(
    effect: Option<&EffectDefinition>,
    args: Vec<(Spanned<String>, Expr)>,
    position: Position,
    diagnostics: &mut Diagnostics,
) -> Vec<Argument> {
    let mut given: FxHashMap<String, Expr> = FxHashMap::default();
    for (name, mut value) in args {
        let found = Checker::new(diagnostics).check_expr(&mut value);
        let Some(effect) = effect else {
            continue;
        };
        let Some(param) = effect.param(&name.node) else {
            diagnostics.semantic(
                name.position,
                format!("effect `{}` has no parameter `{}`", effect.name, name.node),
            );
            continue;
        };
        if found.conflicts_with(param.kind) {
            diagnostics.semantic(
                value.position,
                format!(
                    "argument `{}` must be {}, found {}",
                    name.node, param.kind, found
                ),
            );
        }
        if given.insert(name.node.clone(), value).is_some() {
            diagnostics.semantic(
                name.position,
                format!("argument `{}` is given twice", name.node),
            );
        }
    }

    let Some(effect) = effect else {
        return Vec::new();
    };
    let mut ordered = Vec::with_capacity(effect.params.len());
    for param in &effect.params {
        match given.remove(&param.name) {
            Some(value) => ordered.push(Argument {
                name: param.name.clone(),
                value,
            }),
            None => diagnostics.semantic(
                position,
                format!(
                    "missing argument `{}` for effect `{}`",
                    param.name, effect.name
                ),
            ),
        }
    }
    ordered
}

fn lower_selector(
    block: SelectorBlock,
    in_post_action: bool,
    diagnostics: &mut Diagnostics,
) -> Option<Selector> {
    let source = match &block.source {
        None => {
            diagnostics.semantic(block.position, "selector is missing `Source`");
            None
        }
        Some(name) => match Source::from_name(&name.node) {
            Some(Source::Parent) if !in_post_action => {
                diagnostics.semantic(
                    name.position,
                    "`parent` source is only allowed inside a PostAction",
                );
                None
            }
            Some(source) => Some(source),
            None => {
                diagnostics.semantic(
                    name.position,
                    format!("unknown selector source `{}`", name.node),
                );
                None
            }
        },
    };

    let single = match block.single {
        Some(mut single) => {
            let found = Checker::new(diagnostics).check_expr(&mut single);
            if found.conflicts_with(ValueKind::Bool) {
                diagnostics.semantic(
                    single.position,
                    format!("`Single` must be Bool, found {}", found),
                );
            }
            single
        }
        None => {
            let mut single = Expr::literal(Literal::Bool(false), block.position);
            single.value_kind = ValueKind::Bool;
            single
        }
    };

    let predicate = match block.predicate {
        Some(mut predicate) => {
            Checker::new(diagnostics).check_lambda(&mut predicate.node, predicate.position);
            Some(predicate.node)
        }
        None => {
            diagnostics.semantic(block.position, "selector is missing `Predicate`");
            None
        }
    };

    Some(Selector {
        source: source?,
        single,
        predicate: predicate?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ast::TopLevel;
    use crate::script::lexer::tokenize;
    use crate::script::parser::parse;

    fn lower(source: &str) -> (Vec<CardDefinition>, Diagnostics, Lowering) {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(source, &mut diagnostics);
        let blocks = parse(&tokens, &mut diagnostics);
        let mut lowering = Lowering::new();
        let mut cards = Vec::new();
        for block in blocks {
            match block {
                TopLevel::Effect(effect) => lowering.lower_effect(effect, false, &mut diagnostics),
                TopLevel::Card(card) => cards.extend(lowering.lower_card(card, false, &mut diagnostics)),
            }
        }
        (cards, diagnostics, lowering)
    }

    fn messages(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics.iter().map(|d| d.message.clone()).collect()
    }

    const DAMAGE: &str = r#"
        effect {
            Name: "Damage",
            Params: { Amount: Number },
            Action: (targets, context) => {
                for target in targets {
                    target.Power -= Amount;
                };
            }
        }
    "#;

    #[test]
    fn test_card_with_invocation() {
        let source = format!(
            "{}{}",
            DAMAGE,
            r#"
            card {
                Type: "Gold",
                Name: "Geralt",
                Faction: "Neutral",
                Power: 8,
                Range: ["Melee"],
                OnActivation: [
                    {
                        Effect: { Name: "Damage", Amount: 2 },
                        Selector: {
                            Source: "otherField",
                            Single: false,
                            Predicate: (unit) => unit.Power > 3
                        }
                    }
                ]
            }
        "#
        );
        let (cards, diagnostics, lowering) = lower(&source);
        assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
        assert_eq!(lowering.effects().len(), 1);

        let card = &cards[0];
        assert_eq!(card.id, CardId::new(0));
        assert_eq!(card.power, 8);
        let invocation = &card.on_activation[0];
        assert_eq!(invocation.name(), "Damage");
        assert_eq!(invocation.args[0].name, "Amount");
        assert_eq!(invocation.selector.as_ref().map(|s| s.source), Some(Source::OtherField));
    }

    #[test]
    fn test_unknown_categories() {
        let (cards, diagnostics, _) = lower(
            r#"card { Type: "Bronze", Name: "X", Faction: "Elves", Range: ["Air"] }"#,
        );
        assert!(cards.is_empty());
        assert_eq!(
            messages(&diagnostics),
            vec![
                "unknown card type `Bronze`",
                "unknown faction `Elves`",
                "unknown range `Air`",
            ]
        );
    }

    #[test]
    fn test_unit_needs_range_but_weather_does_not() {
        let (cards, diagnostics, _) = lower(
            r#"
            card { Type: "Silver", Name: "A", Faction: "Monsters" }
            card { Type: "Weather", Name: "Fog", Faction: "Neutral" }
            "#,
        );
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Fog");
        assert_eq!(cards[0].id, CardId::new(0));
        assert_eq!(messages(&diagnostics), vec!["unit card `A` needs at least one range"]);
    }

    #[test]
    fn test_argument_errors() {
        let source = format!(
            "{}{}",
            DAMAGE,
            r#"
            card {
                Type: "Leader", Name: "L", Faction: "Nilfgaard",
                OnActivation: [
                    { Effect: { Name: "Damage", Amount: "two", Bonus: 1 } },
                    { Effect: "Damage" },
                    { Effect: "Heal" }
                ]
            }
        "#
        );
        let (cards, diagnostics, _) = lower(&source);
        assert!(cards.is_empty());
        assert_eq!(
            messages(&diagnostics),
            vec![
                "argument `Amount` must be Int, found String",
                "effect `Damage` has no parameter `Bonus`",
                "missing argument `Amount` for effect `Damage`",
                "unknown effect `Heal`",
            ]
        );
    }

    #[test]
    fn test_broken_effect_reported_once_per_use() {
        let (cards, diagnostics, _) = lower(
            r#"
            effect { Name: "Bad", Action: (targets, context) => { x = 1 + true; } }
            card { Type: "Leader", Name: "L", Faction: "Skellige", OnActivation: [{ Effect: "Bad" }] }
            "#,
        );
        assert!(cards.is_empty());
        let messages = messages(&diagnostics);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], "effect `Bad` failed to compile");
    }

    #[test]
    fn test_parent_only_in_post_action() {
        let source = format!(
            "{}{}",
            DAMAGE,
            r#"
            card {
                Type: "Leader", Name: "L", Faction: "Skellige",
                OnActivation: [
                    {
                        Effect: { Name: "Damage", Amount: 1 },
                        Selector: { Source: "parent", Predicate: (c) => true },
                        PostAction: {
                            Effect: { Name: "Damage", Amount: 1 },
                            Selector: { Source: "parent", Predicate: (c) => true }
                        }
                    }
                ]
            }
        "#
        );
        let (_, diagnostics, _) = lower(&source);
        assert_eq!(
            messages(&diagnostics),
            vec!["`parent` source is only allowed inside a PostAction"]
        );
    }

    #[test]
    fn test_selector_defaults_and_checks() {
        let source = format!(
            "{}{}",
            DAMAGE,
            r#"
            card {
                Type: "Leader", Name: "L", Faction: "Skellige",
                OnActivation: [
                    {
                        Effect: { Name: "Damage", Amount: 1 },
                        Selector: { Source: "deck", Single: 1, Predicate: (c) => c.Power }
                    }
                ]
            }
        "#
        );
        let (_, diagnostics, _) = lower(&source);
        assert_eq!(
            messages(&diagnostics),
            vec![
                "`Single` must be Bool, found Int",
                "predicate body must be Bool, found Int",
            ]
        );
    }

    #[test]
    fn test_duplicates() {
        let (cards, diagnostics, _) = lower(
            r#"
            effect { Name: "E", Params: { A: Number, A: Bool }, Action: (t, c) => { } }
            effect { Name: "E", Action: (t, c) => { } }
            card { Type: "Gold", Name: "Twin", Faction: "Neutral", Range: ["Melee", "Melee"] }
            card { Type: "Leader", Name: "Twin", Faction: "Neutral" }
            "#,
        );
        assert!(cards.is_empty());
        assert_eq!(
            messages(&diagnostics),
            vec![
                "parameter `A` is declared twice",
                "effect `E` is already defined",
                "range `Melee` is listed twice",
                "card `Twin` is already defined",
            ]
        );
    }
}
