//! Property-based tests for the identifier checks.

use proptest::prelude::*;
use vergino::{classify, is_valid_tax_number, is_valid_tckn, is_valid_vkn, TaxNumberKind};

/// Independent VKN check digit, straight from the published formula.
fn vkn_check_digit(first_nine: &[u32]) -> u32 {
    let mut sum = 0;
    for (i, &digit) in first_nine.iter().enumerate() {
        let tmp = (digit + 10 - (i as u32 + 1)) % 10;
        sum += if tmp == 9 { 9 } else { (tmp * (1 << (9 - i))) % 9 };
    }
    (10 - sum % 10) % 10
}

/// Independent TCKN check digits (tenth, eleventh).
fn tckn_check_digits(first_nine: &[u32]) -> (u32, u32) {
    let odd: i64 = first_nine.iter().step_by(2).map(|&d| d as i64).sum();
    let even: i64 = first_nine.iter().skip(1).step_by(2).map(|&d| d as i64).sum();
    let tenth = (odd * 7 - even).rem_euclid(10) as u32;
    let eleventh = (first_nine.iter().sum::<u32>() + tenth) % 10;
    (tenth, eleventh)
}

fn render(digits: &[u32]) -> String {
    digits.iter().map(|d| char::from_digit(*d, 10).unwrap()).collect()
}

proptest! {
    /// Nothing outside lengths 10 and 11 is ever accepted.
    #[test]
    fn wrong_length_is_never_valid(s in "\\PC{0,20}") {
        prop_assume!(s.len() != 10 && s.len() != 11);
        prop_assert!(!is_valid_tax_number(&s));
    }

    /// A computed check digit always validates; any other digit never does.
    #[test]
    fn vkn_check_digit_is_exact(
        first_nine in prop::collection::vec(0u32..10, 9),
        wrong in 1u32..10,
    ) {
        let check = vkn_check_digit(&first_nine);

        let mut digits = first_nine.clone();
        digits.push(check);
        prop_assert!(is_valid_vkn(&render(&digits)));
        prop_assert_eq!(classify(&render(&digits)), Some(TaxNumberKind::Vkn));

        digits[9] = (check + wrong) % 10;
        prop_assert!(!is_valid_vkn(&render(&digits)));
    }

    /// Generated TCKNs validate; changing either check digit breaks them.
    #[test]
    fn tckn_check_digits_are_exact(
        lead in 1u32..10,
        rest in prop::collection::vec(0u32..10, 8),
        wrong in 1u32..10,
    ) {
        let mut first_nine = vec![lead];
        first_nine.extend(rest);
        let (tenth, eleventh) = tckn_check_digits(&first_nine);

        let mut digits = first_nine.clone();
        digits.push(tenth);
        digits.push(eleventh);
        prop_assert!(is_valid_tckn(&render(&digits)));
        prop_assert_eq!(classify(&render(&digits)), Some(TaxNumberKind::Tckn));

        let mut bad_tenth = digits.clone();
        bad_tenth[9] = (tenth + wrong) % 10;
        prop_assert!(!is_valid_tckn(&render(&bad_tenth)));

        let mut bad_eleventh = digits.clone();
        bad_eleventh[10] = (eleventh + wrong) % 10;
        prop_assert!(!is_valid_tckn(&render(&bad_eleventh)));
    }

    /// Leading zero is rejected whatever the checksums say.
    #[test]
    fn tckn_leading_zero_always_invalid(rest in prop::collection::vec(0u32..10, 10)) {
        let mut digits = vec![0];
        digits.extend(rest);
        prop_assert!(!is_valid_tckn(&render(&digits)));
    }

    /// One non-digit anywhere disqualifies an otherwise valid VKN.
    #[test]
    fn vkn_with_non_digit_is_invalid(
        first_nine in prop::collection::vec(0u32..10, 9),
        position in 0usize..10,
        letter in "[a-zA-Z ]",
    ) {
        let mut digits = first_nine.clone();
        digits.push(vkn_check_digit(&first_nine));
        let mut text: Vec<String> = digits.iter().map(|d| d.to_string()).collect();
        text[position] = letter;

        prop_assert!(!is_valid_tax_number(&text.concat()));
    }
}
