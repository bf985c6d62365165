use super::token_type::TokenType;

/// Binding power of an operator; higher binds tighter. `LOWEST` is below every operator.
pub type Precedence = u8;

pub const LOWEST: Precedence = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}

impl Assoc {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Assoc::Left),
            "right" => Some(Assoc::Right),
            "none" | "nonassoc" => Some(Assoc::Nonassoc),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Assoc::Left => "left",
            Assoc::Right => "right",
            Assoc::Nonassoc => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub token: TokenType,
    pub precedence: Precedence,
    pub associativity: Assoc,
}

impl OpInfo {
    /// Minimum binding power accepted for the right-hand operand.
    pub fn rhs_precedence(&self) -> Precedence {
        match self.associativity {
            Assoc::Left | Assoc::Nonassoc => self.precedence,
            Assoc::Right => self.precedence.saturating_sub(1),
        }
    }
}

/// Builds operator tables from grammar declarations.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    infix: Vec<OpInfo>,
    prefix: Vec<OpInfo>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when `token` already has an infix entry.
    pub fn add_infix(&mut self, info: OpInfo) -> bool {
        if self.infix(info.token).is_some() {
            return false;
        }
        self.infix.push(info);
        true
    }

    pub fn add_prefix(&mut self, info: OpInfo) -> bool {
        if self.prefix(info.token).is_some() {
            return false;
        }
        self.prefix.push(info);
        true
    }

    pub fn infix(&self, token: TokenType) -> Option<OpInfo> {
        self.infix.iter().copied().find(|op| op.token == token)
    }

    pub fn prefix(&self, token: TokenType) -> Option<OpInfo> {
        self.prefix.iter().copied().find(|op| op.token == token)
    }

    pub fn infix_operators(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.infix.iter().map(|op| op.token)
    }

    pub fn max_precedence(&self) -> Precedence {
        self.infix
            .iter()
            .chain(self.prefix.iter())
            .map(|op| op.precedence)
            .max()
            .unwrap_or(LOWEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(token: TokenType, precedence: Precedence, associativity: Assoc) -> OpInfo {
        OpInfo {
            token,
            precedence,
            associativity,
        }
    }

    #[test]
    fn right_associative_operators_bind_rhs_looser() {
        assert_eq!(op(TokenType::Caret, 7, Assoc::Right).rhs_precedence(), 6);
        assert_eq!(op(TokenType::Plus, 5, Assoc::Left).rhs_precedence(), 5);
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let mut table = OperatorTable::new();
        assert!(table.add_infix(op(TokenType::Plus, 5, Assoc::Left)));
        assert!(!table.add_infix(op(TokenType::Plus, 6, Assoc::Left)));
        assert!(table.add_prefix(op(TokenType::Minus, 8, Assoc::Right)));
        assert_eq!(table.infix(TokenType::Plus).map(|o| o.precedence), Some(5));
        assert_eq!(table.max_precedence(), 8);
    }
}
