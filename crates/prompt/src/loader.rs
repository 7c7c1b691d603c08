//! Prompt loader for YAML prompt definitions.
//!
//! Workspace prompts in `.sefer/prompts/<id>.yml` take precedence over the
//! definitions compiled into the binary.

use crate::types::PromptDefinition;
use sefer_core::{AppError, AppResult};
use std::path::Path;

/// Answer prompt used by `ask` and `chat`.
pub const ANSWER_PROMPT_ID: &str = "answer.default";

/// Translation prompt used by `translate`.
pub const TRANSLATE_PROMPT_ID: &str = "translate.default";

const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    (
        ANSWER_PROMPT_ID,
        include_str!("../prompts/answer.default.yml"),
    ),
    (
        TRANSLATE_PROMPT_ID,
        include_str!("../prompts/translate.default.yml"),
    ),
];

/// Load a prompt definition by ID.
///
/// Searches `.sefer/prompts/<id>.yml` under the workspace first, then the
/// built-in definitions.
///
/// # Example
/// ```no_run
/// use sefer_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "answer.default")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".sefer/prompts")
        .join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition = parse_prompt(&contents, &format!("{:?}", prompt_file))?;
        tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);
        return Ok(definition);
    }

    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Prompt not found: {}", prompt_id)))?;

    tracing::debug!("Using built-in prompt: {}", prompt_id);
    parse_prompt(contents, prompt_id)
}

/// List all available prompt IDs, built-in and workspace, sorted.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();

    let prompts_dir = workspace_path.join(".sefer/prompts");
    if prompts_dir.exists() {
        for entry in walkdir::WalkDir::new(&prompts_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prompt_ids.push(stem.to_string());
                }
            }
        }
    }

    prompt_ids.sort();
    prompt_ids.dedup();
    Ok(prompt_ids)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if def.context.max_source_chars == Some(0) {
        return Err(AppError::Prompt(
            "maxSourceChars must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_prompt(dir: &Path, id: &str, valid: bool) -> PathBuf {
        let prompts_dir = dir.join(".sefer/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();

        let content = if valid {
            format!(
                r#"
id: {}
title: "Workspace Prompt"
apiVersion: "1.0"
createdBy: test
behavior:
  tone: plain
  style: concise
template: "Q: {{{{query}}}}"
output:
  format: text
"#,
                id
            )
        } else {
            "invalid: yaml: content:".to_string()
        };

        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_builtin_prompts_are_valid() {
        let temp_dir = TempDir::new().unwrap();
        for id in [ANSWER_PROMPT_ID, TRANSLATE_PROMPT_ID] {
            let prompt = load_prompt(temp_dir.path(), id).unwrap();
            assert_eq!(prompt.id, id);
        }
    }

    #[test]
    fn test_workspace_prompt_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), ANSWER_PROMPT_ID, true);

        let prompt = load_prompt(temp_dir.path(), ANSWER_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Workspace Prompt");
        assert_eq!(prompt.template, "Q: {{query}}");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            load_prompt(temp_dir.path(), "nonexistent"),
            Err(AppError::Prompt(_))
        ));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), "invalid", false);
        assert!(load_prompt(temp_dir.path(), "invalid").is_err());
    }

    #[test]
    fn test_list_prompts_merges_builtin_and_workspace() {
        let temp_dir = TempDir::new().unwrap();
        create_test_prompt(temp_dir.path(), "custom", true);
        create_test_prompt(temp_dir.path(), ANSWER_PROMPT_ID, true);

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(
            prompts,
            vec![
                ANSWER_PROMPT_ID.to_string(),
                "custom".to_string(),
                TRANSLATE_PROMPT_ID.to_string()
            ]
        );
    }
}
