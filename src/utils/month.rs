use std::fmt;
use std::str::FromStr;

use crate::errors::TrendpressError;

/// 보고서 대상 월. 설정 파일에는 "10월" 형태로 적지만 "10"도 허용한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month(u32);

impl Month {
    pub fn new(number: u32) -> Result<Self, TrendpressError> {
        if (1..=12).contains(&number) {
            Ok(Month(number))
        } else {
            Err(TrendpressError::date_parse(format!(
                "월은 1~12 사이여야 합니다: {}",
                number
            )))
        }
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// "10월" 형태의 표시 문자열
    pub fn label(self) -> String {
        format!("{}월", self.0)
    }
}

impl FromStr for Month {
    type Err = TrendpressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix('월').unwrap_or(trimmed).trim();
        let number: u32 = digits.parse().map_err(|_| {
            TrendpressError::date_parse(format!("월을 해석할 수 없습니다: '{}'", s))
        })?;
        Month::new(number)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}월", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_korean_suffix() {
        assert_eq!("10월".parse::<Month>().unwrap().number(), 10);
        assert_eq!("1월".parse::<Month>().unwrap().number(), 1);
    }

    #[test]
    fn parses_bare_number() {
        assert_eq!("7".parse::<Month>().unwrap().number(), 7);
        assert_eq!(" 12 ".parse::<Month>().unwrap().number(), 12);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!("0".parse::<Month>().is_err());
        assert!("13월".parse::<Month>().is_err());
        assert!("시월".parse::<Month>().is_err());
    }

    #[test]
    fn displays_with_suffix() {
        assert_eq!(Month::new(10).unwrap().to_string(), "10월");
    }
}
