/// Validates a Brazilian CPF number, with or without formatting
/// (`123.456.789-09` and `12345678909` are both accepted).
///
/// Both check digits are verified with the standard mod-11 algorithm;
/// remainders of 10 and 11 collapse to 0.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest >= 10 { 0 } else { rest }
    };

    check(9) == digits[9] && check(10) == digits[10]
}
