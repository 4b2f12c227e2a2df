//! Effect executor integration tests.
//!
//! Cards are compiled from source, spawned into a two-player `GameState`
//! and played, so every test runs the full compile-then-execute path.

use card_script::cards::CardRegistry;
use card_script::core::{EngineConfig, EntityId, ExecutorConfig, GameState, PlayerId, ZoneId};
use card_script::effects::{activate, ActivationReport, GameContext, RuntimeError, ZoneRef};
use card_script::script::compile_source;

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

const LIBRARY: &str = r#"
effect {
    Name: "Damage",
    Params: { Amount: Number },
    Action: (targets, context) => {
        for target in targets {
            target.Power -= Amount;
        };
    }
}

effect {
    Name: "Exhume",
    Action: (targets, context) => {
        context.Hand.Push(context.Graveyard.Pop());
    }
}

effect {
    Name: "Arithmetic",
    Action: (targets, context) => {
        for t in targets {
            t.Power = 1 + 2 * 3;
        };
    }
}

effect {
    Name: "Logic",
    Action: (targets, context) => {
        for t in targets {
            if (true and false or true) { t.Power = 1; } else { t.Power = 2; };
        };
    }
}

effect {
    Name: "Spin",
    Action: (targets, context) => {
        x = 0;
        while (true) x++;
    }
}

effect {
    Name: "Divide",
    Params: { By: Number },
    Action: (targets, context) => {
        for t in targets {
            t.Power /= By;
        };
    }
}

effect {
    Name: "Peek",
    Action: (targets, context) => {
        found = context.Hand.Find((c) => true);
        found.Pop();
        found.Shuffle();
        count = found.Count;
        for t in targets {
            t.Power = count;
        };
    }
}

effect {
    Name: "Bury",
    Action: (targets, context) => {
        for t in targets {
            context.Graveyard.SendBottom(t);
        };
    }
}

effect {
    Name: "Rename",
    Action: (targets, context) => {
        for t in targets {
            if (t.Name @@ "the Wolf" == "Geralt the Wolf") {
                t.Power = 100;
            };
        };
    }
}

card { Type: "Silver", Name: "Soldier", Faction: "Skellige", Power: 2, Range: ["Melee"] }
card { Type: "Gold", Name: "Knight", Faction: "Skellige", Power: 5, Range: ["Melee"] }
card { Type: "Gold", Name: "Geralt", Faction: "Neutral", Power: 8, Range: ["Melee"] }

card {
    Type: "Leader", Name: "Necromancer", Faction: "Monsters",
    OnActivation: [
        { Effect: "Exhume" },
        {
            Effect: { Name: "Damage", Amount: 1 },
            Selector: { Source: "otherField", Predicate: (c) => true }
        }
    ]
}

card {
    Type: "Leader", Name: "Scholar", Faction: "Neutral",
    OnActivation: [
        {
            Effect: "Arithmetic",
            Selector: { Source: "field", Single: true, Predicate: (c) => c.Name == "Scholar" }
        }
    ]
}

card {
    Type: "Leader", Name: "Logician", Faction: "Neutral",
    OnActivation: [
        {
            Effect: "Logic",
            Selector: { Source: "field", Predicate: (c) => c.Type == "Leader" }
        }
    ]
}

card {
    Type: "Leader", Name: "Executioner", Faction: "Nilfgaard",
    OnActivation: [
        {
            Effect: { Name: "Damage", Amount: 1 },
            Selector: { Source: "otherField", Predicate: (c) => true },
            PostAction: {
                Effect: "ReturnToDeck",
                Selector: { Source: "parent", Predicate: (c) => c.Power < 2 }
            }
        }
    ]
}

card {
    Type: "Leader", Name: "Scout", Faction: "Nilfgaard",
    OnActivation: [{ Effect: "Draw" }, { Effect: "Draw" }]
}

card { Type: "Leader", Name: "Dervish", Faction: "Skellige", OnActivation: [{ Effect: "Spin" }] }

card {
    Type: "Leader", Name: "Zero", Faction: "Skellige",
    OnActivation: [
        {
            Effect: { Name: "Divide", By: 10 - 10 },
            Selector: { Source: "otherField", Predicate: (c) => true }
        }
    ]
}

card {
    Type: "Leader", Name: "Seer", Faction: "Neutral",
    OnActivation: [
        {
            Effect: "Peek",
            Selector: { Source: "field", Single: true, Predicate: (c) => c.Name == "Seer" }
        }
    ]
}

card {
    Type: "Leader", Name: "Gravedigger", Faction: "Monsters",
    OnActivation: [
        { Effect: "Bury", Selector: { Source: "otherHand", Predicate: (c) => c.Power > 3 } }
    ]
}

card {
    Type: "Leader", Name: "Bard", Faction: "Neutral",
    OnActivation: [
        { Effect: "Rename", Selector: { Source: "board", Predicate: (c) => c.Power > 0 } }
    ]
}
"#;

struct Table {
    state: GameState,
    registry: CardRegistry,
    config: ExecutorConfig,
}

impl Table {
    fn new() -> Self {
        let compilation = compile_source(LIBRARY);
        assert!(compilation.is_clean(), "{}", compilation.report());
        Self {
            state: GameState::new(EngineConfig::new(2).with_seed(11)),
            registry: compilation.registry(),
            config: ExecutorConfig::default(),
        }
    }

    fn spawn(&mut self, name: &str, owner: PlayerId, zone: ZoneId) -> EntityId {
        let definition = self
            .registry
            .get_by_name(name)
            .unwrap_or_else(|| panic!("no card named {}", name));
        self.state.spawn(definition, owner, zone)
    }

    /// Put `name` in `player`'s hand and play it into its first slot.
    fn play(&mut self, name: &str, player: PlayerId) -> ActivationReport {
        let entity = self.spawn(name, player, ZoneId::hand(player));
        let zone = self.registry.get_by_name(name).unwrap().placements()[0];
        self.state
            .play_card(player, entity, zone, &self.registry, &self.config)
            .unwrap()
    }

    fn power(&self, entity: EntityId) -> i64 {
        self.state.card(entity).unwrap().power
    }
}

/// Test that a failing invocation does not stop its sibling.
#[test]
fn test_runtime_isolation() {
    let mut table = Table::new();
    let soldier = table.spawn("Soldier", P1, ZoneId::field(P1));
    let knight = table.spawn("Knight", P1, ZoneId::field(P1));

    let report = table.play("Necromancer", P0);

    assert_eq!(report.outcomes.len(), 2);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].effect, "Exhume");
    assert_eq!(
        failures[0].error,
        RuntimeError::EmptyCollection { operation: "pop" }
    );
    assert!(report.outcomes[1].is_ok());

    assert_eq!(table.power(soldier), 1);
    assert_eq!(table.power(knight), 4);
}

/// Test the user-facing failure lines.
#[test]
fn test_failure_report_lines() {
    let mut table = Table::new();
    let report = table.play("Necromancer", P0);

    let lines = report.report_lines();
    assert_eq!(lines[0], "error executing effect");
    assert_eq!(lines[1], "cannot pop from an empty collection");
    assert_eq!(report.runtime_diagnostics().len(), 1);
}

/// Test `1 + 2 * 3` evaluates to 7.
#[test]
fn test_arithmetic_precedence() {
    let mut table = Table::new();
    table.play("Scholar", P0);

    let scholar = table.state.cards_in(ZoneId::field(P0))[0];
    assert_eq!(table.power(scholar), 7);
}

/// Test `true and false or true` evaluates to true.
#[test]
fn test_logic_precedence() {
    let mut table = Table::new();
    table.play("Logician", P0);

    let logician = table.state.cards_in(ZoneId::field(P0))[0];
    assert_eq!(table.power(logician), 1);
}

/// Test that a post action sees its parent's targets.
#[test]
fn test_post_action_uses_parent_targets() {
    let mut table = Table::new();
    let soldier = table.spawn("Soldier", P1, ZoneId::field(P1));
    let knight = table.spawn("Knight", P1, ZoneId::field(P1));
    let bystander = table.spawn("Soldier", P0, ZoneId::field(P0));

    let report = table.play("Executioner", P0);

    assert!(report.is_clean());
    assert_eq!(table.state.cards_in(ZoneId::field(P1)), vec![knight]);
    assert_eq!(table.state.cards_in(ZoneId::deck(P1)), vec![soldier]);
    assert_eq!(table.power(bystander), 2);
}

/// Test the built-in Draw effect.
#[test]
fn test_draw() {
    let mut table = Table::new();
    let bottom = table.spawn("Soldier", P0, ZoneId::deck(P0));
    let top = table.spawn("Knight", P0, ZoneId::deck(P0));

    let report = table.play("Scout", P0);

    assert!(report.is_clean());
    assert_eq!(table.state.cards_in(ZoneId::hand(P0)), vec![top, bottom]);
    assert!(table.state.cards_in(ZoneId::deck(P0)).is_empty());
}

/// Test Draw from an empty deck fails each time without aborting the card.
#[test]
fn test_draw_from_empty_deck() {
    let mut table = Table::new();
    let report = table.play("Scout", P0);

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.failures().count(), 2);
}

/// Test the `while` iteration limit.
#[test]
fn test_loop_limit() {
    let mut table = Table::new();
    table.config = ExecutorConfig::default().with_max_loop_iterations(50);

    let report = table.play("Dervish", P0);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.error, RuntimeError::LoopLimit(50));
}

/// Test division by zero in a compound assignment.
#[test]
fn test_division_by_zero() {
    let mut table = Table::new();
    let soldier = table.spawn("Soldier", P1, ZoneId::field(P1));

    let report = table.play("Zero", P0);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.error, RuntimeError::DivisionByZero);
    assert_eq!(table.power(soldier), 2);
}

/// Test that `Find` results are detached from the zone they came from.
#[test]
fn test_find_is_detached() {
    let mut table = Table::new();
    table.spawn("Soldier", P0, ZoneId::hand(P0));
    table.spawn("Knight", P0, ZoneId::hand(P0));
    table.spawn("Geralt", P0, ZoneId::hand(P0));

    let report = table.play("Seer", P0);

    assert!(report.is_clean());
    assert_eq!(table.state.cards_in(ZoneId::hand(P0)).len(), 3);
    let seer = table.state.cards_in(ZoneId::field(P0))[0];
    assert_eq!(table.power(seer), 2);
}

/// Test `SendBottom` and an "other" source.
#[test]
fn test_send_bottom_from_other_hand() {
    let mut table = Table::new();
    let buried = table.spawn("Soldier", P0, ZoneId::graveyard(P0));
    table.spawn("Soldier", P1, ZoneId::hand(P1));
    let knight = table.spawn("Knight", P1, ZoneId::hand(P1));

    table.play("Gravedigger", P0);

    assert_eq!(
        table.state.cards_in(ZoneId::graveyard(P0)),
        vec![knight, buried]
    );
    assert_eq!(table.state.cards_in(ZoneId::hand(P1)).len(), 1);
}

/// Test that an empty selector match is a note, not a failure.
#[test]
fn test_selector_without_matches() {
    let mut table = Table::new();
    let report = table.play("Gravedigger", P0);

    assert!(report.is_clean());
    let execution = report.outcomes[0].as_ref().unwrap();
    assert_eq!(execution.diagnostics.len(), 1);
    assert_eq!(
        execution.diagnostics[0].message,
        "selector on `otherHand` matched no cards"
    );
}

/// Test string concatenation and the board source.
#[test]
fn test_concat_on_board() {
    let mut table = Table::new();
    let geralt = table.spawn("Geralt", P1, ZoneId::field(P1));
    let knight = table.spawn("Knight", P0, ZoneId::field(P0));

    table.play("Bard", P0);

    assert_eq!(table.power(geralt), 100);
    assert_eq!(table.power(knight), 5);
}

/// Test running a card's effects directly against a context.
#[test]
fn test_activate_without_playing() {
    let mut table = Table::new();
    let soldier = table.spawn("Soldier", P0, ZoneId::field(P0));
    table.state.active_player = P1;

    let necromancer = table.registry.get_by_name("Necromancer").unwrap().clone();
    let report = activate(&necromancer, &mut table.state, &table.config);

    assert_eq!(report.card, "Necromancer");
    assert_eq!(report.failures().count(), 1);
    assert_eq!(table.power(soldier), 1);
    assert_eq!(table.state.cards(ZoneRef::Board), vec![soldier]);
}
