use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// A statement's line in the compiled script.
///
/// Real source lines have `seq == 0`. Lowering issues synthetic coordinates
/// under a real base line (`3.1`, `3.2`, ...) so generated statements sort
/// before the statement they were hoisted out of without colliding with any
/// real line. Ordering is by `(base, seq)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCoord {
    base: usize,
    seq: u32,
}

impl LineCoord {
    pub fn real(line: usize) -> Self {
        Self { base: line, seq: 0 }
    }

    pub fn synthetic(base: usize, seq: u32) -> Self {
        Self { base, seq }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    pub fn is_synthetic(&self) -> bool {
        self.seq != 0
    }
}

impl fmt::Display for LineCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seq == 0 {
            write!(f, "{}", self.base)
        } else {
            write!(f, "{}.{}", self.base, self.seq)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLineError(String);

impl fmt::Display for ParseLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a line coordinate", self.0)
    }
}

impl std::error::Error for ParseLineError {}

impl FromStr for LineCoord {
    type Err = ParseLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLineError(s.to_string());
        let (base, seq) = match s.split_once('.') {
            Some((base, seq)) => (base, seq.parse::<u32>().map_err(|_| err())?),
            None => (s, 0),
        };
        let base = base.parse::<usize>().map_err(|_| err())?;
        if s.contains('.') && seq == 0 {
            return Err(err());
        }
        Ok(Self { base, seq })
    }
}

impl Serialize for LineCoord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_and_parses() {
        assert_eq!(LineCoord::real(12).to_string(), "12");
        assert_eq!(LineCoord::synthetic(3, 2).to_string(), "3.2");
        assert_eq!("3.2".parse::<LineCoord>(), Ok(LineCoord::synthetic(3, 2)));
        assert_eq!("7".parse::<LineCoord>(), Ok(LineCoord::real(7)));
        assert!("3.0".parse::<LineCoord>().is_err());
        assert!("x".parse::<LineCoord>().is_err());
    }

    #[test]
    fn orders_numerically_not_lexically() {
        let mut coords = vec![
            LineCoord::real(2),
            LineCoord::synthetic(1, 10),
            LineCoord::synthetic(1, 2),
            LineCoord::real(1),
            LineCoord::real(10),
        ];
        coords.sort();
        let rendered: Vec<String> = coords.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered, vec!["1", "1.2", "1.10", "2", "10"]);
    }
}
