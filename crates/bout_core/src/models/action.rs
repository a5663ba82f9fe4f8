//! Fencing action taxonomy.
//!
//! A touch is classified by a coarse category (attack, counter attack,
//! defense) and a detail that only exists inside its category. Tabulation
//! works on short action codes (`AS`, `CA`, `PR`, ...), several details may
//! share a code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttackDetail {
    Simple,
    Compound,
    WithBlade,
    RemiseAttack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterAttackDetail {
    CounterAttack,
    AttackInAttack,
    RemiseCounterAttack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefenseDetail {
    ParryRiposte,
    AttackOnRecover,
    RemiseDefense,
}

/// A fully classified action: category plus the detail allowed in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Attack(AttackDetail),
    CounterAttack(CounterAttackDetail),
    Defense(DefenseDetail),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    #[serde(rename = "ATTACK")]
    Attack,
    #[serde(rename = "COUNTER ATTACK")]
    CounterAttack,
    #[serde(rename = "DEFENSE")]
    Defense,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 3] =
        [ActionCategory::Attack, ActionCategory::CounterAttack, ActionCategory::Defense];

    pub fn label(self) -> &'static str {
        match self {
            ActionCategory::Attack => "ATTACK",
            ActionCategory::CounterAttack => "COUNTER ATTACK",
            ActionCategory::Defense => "DEFENSE",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label.trim())
    }

    /// Closed set of details selectable under this category.
    pub fn details(self) -> &'static [Action] {
        use Action::*;
        match self {
            ActionCategory::Attack => &[
                Attack(AttackDetail::Simple),
                Attack(AttackDetail::Compound),
                Attack(AttackDetail::WithBlade),
                Attack(AttackDetail::RemiseAttack),
            ],
            ActionCategory::CounterAttack => &[
                CounterAttack(CounterAttackDetail::CounterAttack),
                CounterAttack(CounterAttackDetail::AttackInAttack),
                CounterAttack(CounterAttackDetail::RemiseCounterAttack),
            ],
            ActionCategory::Defense => &[
                Defense(DefenseDetail::ParryRiposte),
                Defense(DefenseDetail::AttackOnRecover),
                Defense(DefenseDetail::RemiseDefense),
            ],
        }
    }

    pub fn admits(self, action: Action) -> bool {
        action.category() == self
    }
}

impl Action {
    pub const SIMPLE: Action = Action::Attack(AttackDetail::Simple);

    pub fn category(self) -> ActionCategory {
        match self {
            Action::Attack(_) => ActionCategory::Attack,
            Action::CounterAttack(_) => ActionCategory::CounterAttack,
            Action::Defense(_) => ActionCategory::Defense,
        }
    }

    /// Button label used when the touch was entered.
    pub fn label(self) -> &'static str {
        match self {
            Action::Attack(AttackDetail::Simple) => "SIMPLE",
            Action::Attack(AttackDetail::Compound) => "COMPOUND",
            Action::Attack(AttackDetail::WithBlade) => "WITH BLADE",
            Action::Attack(AttackDetail::RemiseAttack) => "REMISE ATT",
            Action::CounterAttack(CounterAttackDetail::CounterAttack) => "COUNTER ATTACK",
            Action::CounterAttack(CounterAttackDetail::AttackInAttack) => "ATTACK IN ATTACK",
            Action::CounterAttack(CounterAttackDetail::RemiseCounterAttack) => "REMISE CA",
            Action::Defense(DefenseDetail::ParryRiposte) => "PARRY RIPOSTE",
            Action::Defense(DefenseDetail::AttackOnRecover) => "ATTACK ON RECOVER",
            Action::Defense(DefenseDetail::RemiseDefense) => "REMISE DEF",
        }
    }

    /// Parses a button label, or one of the long labels older records used.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let by_button = ActionCategory::ALL
            .into_iter()
            .flat_map(|category| category.details().iter().copied())
            .find(|action| action.label() == label);
        if by_button.is_some() {
            return by_button;
        }

        match label {
            "Attack Simple" => Some(Action::Attack(AttackDetail::Simple)),
            "Attack Compound" => Some(Action::Attack(AttackDetail::Compound)),
            "Attack with Blade" => Some(Action::Attack(AttackDetail::WithBlade)),
            "Remise Attack" => Some(Action::Attack(AttackDetail::RemiseAttack)),
            "Counter Attack" => Some(Action::CounterAttack(CounterAttackDetail::CounterAttack)),
            "Attack in Attack" => Some(Action::CounterAttack(CounterAttackDetail::AttackInAttack)),
            "Parry Riposte" => Some(Action::Defense(DefenseDetail::ParryRiposte)),
            "Attack on Recover" => Some(Action::Defense(DefenseDetail::AttackOnRecover)),
            "Remise Riposte" => Some(Action::Defense(DefenseDetail::RemiseDefense)),
            _ => None,
        }
    }

    pub fn code(self) -> ActionCode {
        match self {
            Action::Attack(AttackDetail::Simple) => ActionCode::AS,
            Action::Attack(AttackDetail::Compound) => ActionCode::AC,
            Action::Attack(AttackDetail::WithBlade) => ActionCode::AF,
            Action::Attack(AttackDetail::RemiseAttack) => ActionCode::RA,
            Action::CounterAttack(CounterAttackDetail::CounterAttack) => ActionCode::CA,
            Action::CounterAttack(CounterAttackDetail::AttackInAttack) => ActionCode::AA,
            // Remise after a counter attack is tabulated with counter attacks.
            Action::CounterAttack(CounterAttackDetail::RemiseCounterAttack) => ActionCode::CA,
            Action::Defense(DefenseDetail::ParryRiposte) => ActionCode::PR,
            Action::Defense(DefenseDetail::AttackOnRecover) => ActionCode::AR,
            Action::Defense(DefenseDetail::RemiseDefense) => ActionCode::RR,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Short code used for tabulation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ActionCode {
    AS,
    AC,
    AF,
    RA,
    CA,
    AA,
    PR,
    AR,
    RR,
    /// Counter-time; only reachable from old long labels.
    CT,
    /// Label that is not part of the table, kept verbatim.
    Other(String),
}

impl ActionCode {
    /// Maps any free-text label to a code; unknown labels pass through.
    pub fn from_label(label: &str) -> Self {
        if let Some(action) = Action::from_label(label) {
            return action.code();
        }
        if label.trim() == "Counter Time" {
            return ActionCode::CT;
        }
        label.parse().unwrap_or_else(|_| ActionCode::Other(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionCode::AS => "AS",
            ActionCode::AC => "AC",
            ActionCode::AF => "AF",
            ActionCode::RA => "RA",
            ActionCode::CA => "CA",
            ActionCode::AA => "AA",
            ActionCode::PR => "PR",
            ActionCode::AR => "AR",
            ActionCode::RR => "RR",
            ActionCode::CT => "CT",
            ActionCode::Other(label) => label,
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            ActionCode::AS => "Simple Attack",
            ActionCode::AC => "Compound Attack",
            ActionCode::AF => "Attack on the Blade",
            ActionCode::RA => "Attack Remise",
            ActionCode::CA => "Counter Attack",
            ActionCode::AA => "Attack in Attack",
            ActionCode::PR => "Parry Riposte",
            ActionCode::AR => "Attack on Recover",
            ActionCode::RR => "Riposte Remise",
            ActionCode::CT => "Counter Time",
            ActionCode::Other(label) => label,
        }
    }
}

impl FromStr for ActionCode {
    type Err = ();

    /// Parses a short code only; see [`ActionCode::from_label`] for labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "AS" => ActionCode::AS,
            "AC" => ActionCode::AC,
            "AF" => ActionCode::AF,
            "RA" => ActionCode::RA,
            "CA" => ActionCode::CA,
            "AA" => ActionCode::AA,
            "PR" => ActionCode::PR,
            "AR" => ActionCode::AR,
            "RR" => ActionCode::RR,
            "CT" => ActionCode::CT,
            _ => return Err(()),
        })
    }
}

impl From<String> for ActionCode {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(ActionCode::Other(value))
    }
}

impl From<ActionCode> for String {
    fn from(code: ActionCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action carried by a touch.
///
/// Touches entered through the recorder are always classified. Historical
/// records may hold a label outside the taxonomy, which is kept so it still
/// shows up in tabulation under its own name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    Classified(Action),
    Unclassified(String),
}

impl RecordedAction {
    pub fn from_label(label: &str) -> Self {
        match Action::from_label(label) {
            Some(action) => RecordedAction::Classified(action),
            None => RecordedAction::Unclassified(label.to_string()),
        }
    }

    pub fn code(&self) -> ActionCode {
        match self {
            RecordedAction::Classified(action) => action.code(),
            RecordedAction::Unclassified(label) => ActionCode::from_label(label),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RecordedAction::Classified(action) => action.label(),
            RecordedAction::Unclassified(label) => label,
        }
    }

    pub fn category(&self) -> Option<ActionCategory> {
        match self {
            RecordedAction::Classified(action) => Some(action.category()),
            RecordedAction::Unclassified(_) => None,
        }
    }
}

impl Default for RecordedAction {
    fn default() -> Self {
        RecordedAction::Classified(Action::SIMPLE)
    }
}

impl From<Action> for RecordedAction {
    fn from(action: Action) -> Self {
        RecordedAction::Classified(action)
    }
}
