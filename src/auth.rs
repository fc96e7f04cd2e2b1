pub struct Token(String);

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_str_creates_token() {
        let token_str = "52yn3nkmuzjfv7pricuzyhovuaizi7ddmmbbdi5ln3ihsplhvoyq";
        let token = Token::from(token_str);

        assert_eq!(token.as_str(), token_str);
    }

    #[test]
    fn test_token_from_empty_string() {
        let token = Token::from("");

        assert_eq!(token.as_str(), "");
    }

    #[test]
    fn test_token_debug_redacts_value() {
        let sensitive_token = "azdo_very_secret_pat_do_not_log";
        let token = Token::from(sensitive_token);

        let debug_output = format!("{token:?}");

        // Ensure the actual token value is not in the debug output
        assert_eq!(debug_output, "<redacted>");
        assert!(!debug_output.contains(sensitive_token));
        assert!(!debug_output.contains("secret"));
    }

    #[test]
    fn test_token_debug_in_struct() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct ApiClient {
            token: Token,
            endpoint: String,
        }

        let client = ApiClient {
            token: Token::from("super_secret_token"),
            endpoint: String::from("https://dev.azure.com/contoso"),
        };

        let debug_output = format!("{client:?}");

        // Ensure the token is redacted in the struct's debug output
        assert!(debug_output.contains("<redacted>"));
        assert!(!debug_output.contains("super_secret_token"));
        assert!(debug_output.contains("https://dev.azure.com/contoso"));
    }

    #[test]
    fn test_token_owns_its_string() {
        let token = {
            let temp_string = String::from("temporary_token");
            Token::from(temp_string.as_str())
            // temp_string goes out of scope here
        };

        assert_eq!(token.as_str(), "temporary_token");
    }
}
