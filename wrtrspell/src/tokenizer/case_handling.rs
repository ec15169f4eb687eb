use smol_str::SmolStr;

#[inline(always)]
pub fn lower_case(s: &str) -> SmolStr {
    s.chars()
        .map(|c| c.to_lowercase().collect::<String>())
        .collect::<SmolStr>()
}

#[inline(always)]
pub fn upper_case(s: &str) -> SmolStr {
    s.chars()
        .map(|c| c.to_uppercase().collect::<String>())
        .collect::<SmolStr>()
}

#[inline(always)]
pub fn upper_first(s: &str) -> SmolStr {
    let mut c = s.chars();
    match c.next() {
        None => SmolStr::new(""),
        Some(f) => SmolStr::from(f.to_uppercase().collect::<String>() + c.as_str()),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Case {
    Upper,
    Lower,
    Neither,
}

impl Case {
    #[inline(always)]
    fn new(ch: char) -> Case {
        if ch.is_lowercase() {
            Case::Lower
        } else if ch.is_uppercase() {
            Case::Upper
        } else {
            Case::Neither
        }
    }
}

/// True for words like "McDonald" or "iPhone": an upper case letter after the
/// first position while lower case letters are present too.
pub fn is_mixed_case(word: &str) -> bool {
    let cases: Vec<Case> = word.chars().map(Case::new).collect();
    let inner_upper = cases.iter().skip(1).any(|c| *c == Case::Upper);
    let any_lower = cases.iter().any(|c| *c == Case::Lower);

    inner_upper && any_lower
}

/// True when every cased character is upper case and there is at least one.
pub fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && upper_case(word) == word
}

/// True when the word starts with an upper case letter.
pub fn is_first_caps(word: &str) -> bool {
    word.chars().next().map_or(false, char::is_uppercase)
}

/// How the casing of a typed word should be carried over to dictionary forms,
/// which are always stored lower case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMutation {
    FirstCaps,
    AllCaps,
    None,
}

impl CaseMutation {
    pub fn of(word: &str) -> CaseMutation {
        if is_mixed_case(word) {
            CaseMutation::None
        } else if word.chars().filter(|c| c.is_alphabetic()).count() > 1 && is_all_caps(word) {
            CaseMutation::AllCaps
        } else if is_first_caps(word) {
            CaseMutation::FirstCaps
        } else {
            CaseMutation::None
        }
    }

    pub fn apply(self, value: &str) -> SmolStr {
        match self {
            CaseMutation::FirstCaps => upper_first(value),
            CaseMutation::AllCaps => upper_case(value),
            CaseMutation::None => SmolStr::new(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations() {
        assert_eq!(CaseMutation::of("IDENTITETE"), CaseMutation::AllCaps);
        assert_eq!(CaseMutation::of("Identitete"), CaseMutation::FirstCaps);
        assert_eq!(CaseMutation::of("identitete"), CaseMutation::None);
        assert_eq!(CaseMutation::of("McDonald"), CaseMutation::None);
        assert_eq!(CaseMutation::of("I"), CaseMutation::FirstCaps);

        assert_eq!(CaseMutation::FirstCaps.apply("this"), "This");
        assert_eq!(CaseMutation::AllCaps.apply("this"), "THIS");
        assert_eq!(CaseMutation::None.apply("this"), "this");
    }

    #[test]
    fn caps() {
        assert!(is_all_caps("HTML"));
        assert!(is_all_caps("HTML5"));
        assert!(!is_all_caps("1234"));
        assert!(!is_all_caps("Html"));
        assert!(is_first_caps("Teh"));
        assert!(!is_first_caps("teh"));
        assert!(!is_first_caps(""));
        assert_eq!(lower_case("ÅLAND"), "åland");
    }

    #[test]
    fn mixed_case() {
        assert_eq!(is_mixed_case("McDonald"), true);
        assert_eq!(is_mixed_case("Mcdonald"), false);
        assert_eq!(is_mixed_case("McDoNaLd"), true);
        assert_eq!(is_mixed_case("MCDONALD"), false);
        assert_eq!(is_mixed_case("mcDonald"), true);
        assert_eq!(is_mixed_case("mcdonald"), false);

        assert_eq!(is_mixed_case("ab"), false);
        assert_eq!(is_mixed_case("aB"), true);
        assert_eq!(is_mixed_case("Ab"), false);
        assert_eq!(is_mixed_case("AB"), false);

        assert_eq!(is_mixed_case("A"), false);
        assert_eq!(is_mixed_case("a"), false);
        assert_eq!(is_mixed_case(":"), false);

        assert_eq!(is_mixed_case("DavveVássján"), true);
        assert_eq!(is_mixed_case("Davvevássján"), false);
    }
}
