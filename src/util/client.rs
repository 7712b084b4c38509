/// Derive the client name from an issue description.
///
/// By convention the first line of a description reads `client: <name>`;
/// everything after the prefix, trimmed, is the client. The client is never
/// stored as tracker state, so it is recomputed from the description on
/// every read.
pub fn derive_client(description: Option<&str>) -> Option<String> {
    let first_line = description?.lines().next()?;
    let value = first_line.strip_prefix("client:")?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_client_from_first_line() {
        let desc = "client: Acme Corp\ndescription: fix the login flow";
        assert_eq!(derive_client(Some(desc)), Some("Acme Corp".to_string()));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            derive_client(Some("client:   Globex  \nmore text")),
            Some("Globex".to_string())
        );
    }

    #[test]
    fn no_space_after_prefix_is_fine() {
        assert_eq!(derive_client(Some("client:Initech")), Some("Initech".to_string()));
    }

    #[test]
    fn missing_description_is_none() {
        assert_eq!(derive_client(None), None);
    }

    #[test]
    fn empty_description_is_none() {
        assert_eq!(derive_client(Some("")), None);
    }

    #[test]
    fn other_first_line_is_none() {
        assert_eq!(derive_client(Some("just some notes\nclient: Acme")), None);
    }

    #[test]
    fn prefix_is_case_sensitive() {
        assert_eq!(derive_client(Some("Client: Acme")), None);
    }

    #[test]
    fn prefix_without_value_is_none() {
        assert_eq!(derive_client(Some("client:")), None);
        assert_eq!(derive_client(Some("client:   \nrest")), None);
    }
}
