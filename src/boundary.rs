//! Bracket-boundary contamination filter.
//!
//! Approximate dictionary matching happily produces fragments that straddle
//! a parenthetical without covering it whole (`"glutathione transferases ("`,
//! `"GSTA4)"`). Such fragments are noise and never allowed to compete in
//! overlap resolution.

/// Check whether a matched fragment is contaminated by unbalanced brackets.
///
/// The fragment is scanned once with a depth counter per bracket kind over
/// `()`, `[]` and `{}`. A closing bracket that drops a counter below zero,
/// or a nonzero counter at the end of the scan, marks the fragment
/// contaminated. Balanced interior brackets pass.
///
/// # Examples
///
/// ```
/// use dictag::boundary::is_contaminated;
///
/// assert!(is_contaminated("glutathione transferases ("));
/// assert!(is_contaminated("GSTA4)"));
/// assert!(!is_contaminated("Di(hydroxy)-transferase"));
/// ```
#[must_use]
pub fn is_contaminated(fragment: &str) -> bool {
    let mut paren = 0i32;
    let mut square = 0i32;
    let mut curly = 0i32;

    for c in fragment.chars() {
        let depth = match c {
            '(' => {
                paren += 1;
                paren
            }
            ')' => {
                paren -= 1;
                paren
            }
            '[' => {
                square += 1;
                square
            }
            ']' => {
                square -= 1;
                square
            }
            '{' => {
                curly += 1;
                curly
            }
            '}' => {
                curly -= 1;
                curly
            }
            _ => continue,
        };
        // A close without its open inside the fragment.
        if depth < 0 {
            return true;
        }
    }

    paren != 0 || square != 0 || curly != 0
}
