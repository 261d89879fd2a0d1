// YAML frontmatter helpers shared by board documents and config.md

use serde::{Deserialize, Serialize};

/// Frontmatter `type` value that marks a document as a board
pub const BOARD_TYPE: &str = "analog-board";

/// Board document frontmatter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardFrontmatter {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Split `---` delimited YAML frontmatter from the body and deserialize it
pub fn parse_frontmatter<T: serde::de::DeserializeOwned>(content: &str) -> Option<(T, String)> {
    let content = content.trim_start();
    let rest = content.strip_prefix("---")?;
    let end = rest.find("\n---")?;
    let yaml = rest[..end].trim();
    let body = rest[end + 4..].trim().to_string();

    let frontmatter: T = serde_yaml::from_str(yaml).ok()?;
    Some((frontmatter, body))
}

/// Serialize frontmatter + body to markdown
pub fn to_markdown<T: Serialize>(frontmatter: &T, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

/// True when the document's frontmatter declares `type: analog-board`
pub fn is_board_document(content: &str) -> bool {
    parse_frontmatter::<BoardFrontmatter>(content)
        .map(|(fm, _)| fm.kind == BOARD_TYPE)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_board_frontmatter() {
        let doc = "---\ntype: analog-board\ndate: 2024-06-01\n---\n\n## Today\n";
        assert!(is_board_document(doc));
        assert!(is_board_document("---\ntitle: x\ntype: analog-board\n---\n"));
    }

    #[test]
    fn rejects_other_documents() {
        assert!(!is_board_document("# Just notes\n- [ ] task"));
        assert!(!is_board_document("---\ntype: meeting\n---\n"));
        assert!(!is_board_document("---\ntype: analog-board\n"));
    }

    #[test]
    fn frontmatter_round_trips_through_markdown() {
        let fm = BoardFrontmatter {
            kind: BOARD_TYPE.to_string(),
            date: Some("2024-06-01".to_string()),
        };
        let doc = to_markdown(&fm, "## Today").unwrap();
        let (parsed, body) = parse_frontmatter::<BoardFrontmatter>(&doc).unwrap();
        assert_eq!(parsed.kind, BOARD_TYPE);
        assert_eq!(parsed.date.as_deref(), Some("2024-06-01"));
        assert_eq!(body, "## Today");
    }
}
