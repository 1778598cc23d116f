use serde::Deserialize;

/// Request body for creating a recipe. Missing fields are passed through to
/// the store, which decides whether they are acceptable.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i64>,
}

pub const MIN_INSTRUCTIONS_LEN: usize = 50;

/// Rule for instructions: present, and at least `MIN_INSTRUCTIONS_LEN` characters.
pub fn check_instructions(instructions: Option<&str>) -> Result<(), String> {
    match instructions {
        None | Some("") => Err("Instruction must be present".into()),
        Some(s) if s.chars().count() < MIN_INSTRUCTIONS_LEN => Err(format!(
            "Instruction must be at least {MIN_INSTRUCTIONS_LEN} characters long"
        )),
        Some(_) => Ok(()),
    }
}
