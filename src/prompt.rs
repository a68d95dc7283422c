use std::io::{BufRead, Write};

use crate::{
    error::{AppError, AppResult},
    models::Threshold,
    services::providers::AnimeCatalog,
};

const USERNAME_PROMPT: &str = "anilist username? ";
const THRESHOLD_PROMPT: &str = "threshold? ";

/// Prints `prompt` and reads one trimmed line; end of input is an error
fn read_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> AppResult<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(AppError::InvalidInput("input closed".to_string()));
    }
    Ok(line.trim().to_string())
}

/// Shape check done before asking the catalog; names go straight into a URL path
fn is_plausible_username(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Asks for a username until the catalog confirms a profile exists for it
pub async fn prompt_username<R: BufRead, W: Write>(
    catalog: &dyn AnimeCatalog,
    input: &mut R,
    output: &mut W,
) -> AppResult<String> {
    loop {
        let username = read_line(input, output, USERNAME_PROMPT)?;
        if is_plausible_username(&username) && catalog.user_exists(&username).await? {
            return Ok(username);
        }
        tracing::debug!(username = %username, "Rejected username");
        writeln!(output, "invalid username")?;
    }
}

/// Asks for a threshold until the answer is an integer in 0..=100
pub fn prompt_threshold<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> AppResult<Threshold> {
    loop {
        let answer = read_line(input, output, THRESHOLD_PROMPT)?;
        match answer.parse::<Threshold>() {
            Ok(threshold) => return Ok(threshold),
            Err(AppError::InvalidInput(message)) => writeln!(output, "{}", message)?,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockAnimeCatalog;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_username_reprompts_until_profile_exists() {
        let mut catalog = MockAnimeCatalog::new();
        catalog
            .expect_user_exists()
            .withf(|name| name == "nobody")
            .times(1)
            .returning(|_| Ok(false));
        catalog
            .expect_user_exists()
            .withf(|name| name == "Josh")
            .times(1)
            .returning(|_| Ok(true));

        let mut input = Cursor::new("nobody\nJosh\n");
        let mut output = Vec::new();

        let username = prompt_username(&catalog, &mut input, &mut output).await.unwrap();

        assert_eq!(username, "Josh");
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches(USERNAME_PROMPT).count(), 2);
        assert!(shown.contains("invalid username"));
    }

    #[tokio::test]
    async fn test_malformed_username_skips_lookup() {
        let mut catalog = MockAnimeCatalog::new();
        catalog
            .expect_user_exists()
            .withf(|name| name == "ok_name")
            .times(1)
            .returning(|_| Ok(true));

        let mut input = Cursor::new("\n../admin\nok_name\n");
        let mut output = Vec::new();

        let username = prompt_username(&catalog, &mut input, &mut output).await.unwrap();

        assert_eq!(username, "ok_name");
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("invalid username").count(), 2);
    }

    #[tokio::test]
    async fn test_username_end_of_input() {
        let catalog = MockAnimeCatalog::new();
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let err = prompt_username(&catalog, &mut input, &mut output).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_threshold_reprompts_with_reason() {
        let mut input = Cursor::new("abc\n150\n-3\n70\n");
        let mut output = Vec::new();

        let threshold = prompt_threshold(&mut input, &mut output).unwrap();

        assert_eq!(threshold.value(), 70);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches(THRESHOLD_PROMPT).count(), 4);
        assert!(shown.contains("not a numeric value."));
        assert!(shown.contains("above 100"));
        assert!(shown.contains("below 0"));
    }

    #[test]
    fn test_threshold_end_of_input() {
        let mut input = Cursor::new("nope\n");
        let mut output = Vec::new();
        assert!(prompt_threshold(&mut input, &mut output).is_err());
    }

    #[test]
    fn test_username_shape() {
        assert!(is_plausible_username("Some_User-1"));
        assert!(!is_plausible_username(""));
        assert!(!is_plausible_username("a b"));
        assert!(!is_plausible_username("a/b"));
    }

    #[test]
    fn test_username_prompt_blocking() {
        let mut catalog = MockAnimeCatalog::new();
        catalog.expect_user_exists().returning(|_| Ok(true));
        let mut input = Cursor::new("someone\n");
        let mut output = Vec::new();

        let username =
            tokio_test::block_on(prompt_username(&catalog, &mut input, &mut output)).unwrap();
        assert_eq!(username, "someone");
    }
}
