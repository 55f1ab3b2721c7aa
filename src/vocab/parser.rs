//! Tokenizer and statement parser for the constrained vocabulary grammar
//!
//! Statements have the shape
//!
//! ```text
//! :subject a skos:Concept ;
//!     skos:prefLabel "Label" ;
//!     skos:narrower :child1 , :child2 .
//! ```
//!
//! Only the subject, the `prefLabel` literal, and the `narrower` references
//! matter; every other predicate is consumed and ignored. `@prefix`
//! directives and `#` comments are skipped.

use crate::vocab::VocabError;

/// One parsed statement: a subject with its label and narrower relations
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub subject: String,
    pub pref_label: Option<String>,
    pub narrower: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// `:name` - a node reference local to the vocabulary
    LocalName(String),
    /// `prefix:name` - a predicate or class reference
    PrefixedName { local: String },
    /// The `a` type shorthand
    A,
    /// `"..."` string literal, unescaped
    Literal(String),
    /// `<...>` IRI reference
    Iri,
    /// `@prefix`-style directive
    Directive,
    Semicolon,
    Comma,
    Dot,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> VocabError {
        VocabError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn next_token(&mut self) -> Result<Option<(Token, usize)>, VocabError> {
        loop {
            match self.chars.peek() {
                None => return Ok(None),
                Some('\n') => {
                    self.line += 1;
                    self.chars.next();
                }
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('#') => {
                    // Comment to end of line
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                Some(_) => break,
            }
        }

        let line = self.line;
        let c = *self.chars.peek().expect("peeked above");
        let token = match c {
            ';' => {
                self.chars.next();
                Token::Semicolon
            }
            ',' => {
                self.chars.next();
                Token::Comma
            }
            '.' => {
                self.chars.next();
                Token::Dot
            }
            '"' => Token::Literal(self.read_literal()?),
            '<' => {
                self.read_iri()?;
                Token::Iri
            }
            '@' => {
                self.chars.next();
                self.read_name();
                Token::Directive
            }
            ':' => {
                self.chars.next();
                let name = self.read_name();
                if name.is_empty() {
                    return Err(self.error("expected a name after ':'"));
                }
                Token::LocalName(name)
            }
            c if c.is_alphanumeric() || c == '_' => {
                let name = self.read_name();
                if self.chars.peek() == Some(&':') {
                    self.chars.next();
                    // The local part may be empty in a prefix declaration
                    let local = self.read_name();
                    Token::PrefixedName { local }
                } else if name == "a" {
                    Token::A
                } else {
                    return Err(self.error(format!("unexpected bare word '{}'", name)));
                }
            }
            other => return Err(self.error(format!("unexpected character '{}'", other))),
        };

        // Language tags and datatype suffixes decorate literals; drop them
        if matches!(token, Token::Literal(_)) {
            self.skip_literal_suffix();
        }

        Ok(Some((token, line)))
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        name
    }

    fn read_literal(&mut self) -> Result<String, VocabError> {
        self.chars.next(); // opening quote
        let mut value = String::new();
        loop {
            match self.chars.next() {
                None => return Err(self.error("unterminated string literal")),
                Some('"') => return Ok(value),
                Some('\\') => match self.chars.next() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some(other) => value.push(other),
                    None => return Err(self.error("unterminated escape in string literal")),
                },
                Some('\n') => {
                    self.line += 1;
                    value.push('\n');
                }
                Some(other) => value.push(other),
            }
        }
    }

    fn read_iri(&mut self) -> Result<(), VocabError> {
        self.chars.next(); // '<'
        loop {
            match self.chars.next() {
                None => return Err(self.error("unterminated IRI reference")),
                Some('>') => return Ok(()),
                Some('\n') => self.line += 1,
                Some(_) => {}
            }
        }
    }

    fn skip_literal_suffix(&mut self) {
        if self.chars.peek() == Some(&'@') {
            self.chars.next();
            self.read_name();
        } else if self.chars.peek() == Some(&'^') {
            self.chars.next();
            if self.chars.peek() == Some(&'^') {
                self.chars.next();
            }
            // datatype is a prefixed name or IRI; consume its first token shape
            if self.chars.peek() == Some(&'<') {
                let _ = self.read_iri();
            } else {
                self.read_name();
                if self.chars.peek() == Some(&':') {
                    self.chars.next();
                    self.read_name();
                }
            }
        }
    }
}

/// Parse vocabulary source text into its statements.
///
/// Errors on the first malformed statement; [`VocabError::Empty`] when the
/// source yields no statements at all.
pub fn parse_statements(source: &str) -> Result<Vec<Statement>, VocabError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    let mut statements = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        // Directives run to the closing dot
        if matches!(tokens[pos].0, Token::Directive) {
            while pos < tokens.len() && tokens[pos].0 != Token::Dot {
                pos += 1;
            }
            pos += 1;
            continue;
        }
        let statement = parse_statement(&tokens, &mut pos)?;
        statements.push(statement);
    }

    if statements.is_empty() {
        return Err(VocabError::Empty);
    }
    Ok(statements)
}

fn parse_statement(tokens: &[(Token, usize)], pos: &mut usize) -> Result<Statement, VocabError> {
    let error_at = |index: usize, message: String| {
        let line = tokens
            .get(index)
            .or_else(|| tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1);
        VocabError::Parse { line, message }
    };

    let subject = match tokens.get(*pos) {
        Some((Token::LocalName(name), _)) => name.clone(),
        Some((other, _)) => {
            return Err(error_at(*pos, format!("expected statement subject, found {:?}", other)))
        }
        None => return Err(error_at(*pos, "expected statement subject".to_string())),
    };
    *pos += 1;

    let mut statement = Statement {
        subject,
        pref_label: None,
        narrower: Vec::new(),
    };

    loop {
        // Predicate
        let predicate = match tokens.get(*pos) {
            Some((Token::A, _)) => None,
            Some((Token::PrefixedName { local }, _)) => Some(local.clone()),
            Some((other, _)) => {
                return Err(error_at(*pos, format!("expected predicate, found {:?}", other)))
            }
            None => return Err(error_at(*pos, "statement ended before its predicate".to_string())),
        };
        *pos += 1;

        // Object list
        loop {
            match tokens.get(*pos) {
                Some((Token::Literal(value), _)) => {
                    if predicate.as_deref() == Some("prefLabel") && statement.pref_label.is_none() {
                        statement.pref_label = Some(value.clone());
                    }
                }
                Some((Token::LocalName(name), _)) => {
                    if predicate.as_deref() == Some("narrower") {
                        statement.narrower.push(name.clone());
                    }
                }
                Some((Token::PrefixedName { .. }, _)) | Some((Token::Iri, _)) => {}
                Some((other, _)) => {
                    return Err(error_at(*pos, format!("expected object, found {:?}", other)))
                }
                None => {
                    return Err(error_at(*pos, "statement ended before its object".to_string()))
                }
            }
            *pos += 1;

            match tokens.get(*pos) {
                Some((Token::Comma, _)) => *pos += 1,
                _ => break,
            }
        }

        match tokens.get(*pos) {
            Some((Token::Semicolon, _)) => {
                *pos += 1;
                // A trailing semicolon before the dot is tolerated
                if let Some((Token::Dot, _)) = tokens.get(*pos) {
                    *pos += 1;
                    return Ok(statement);
                }
            }
            Some((Token::Dot, _)) => {
                *pos += 1;
                return Ok(statement);
            }
            Some((other, _)) => {
                return Err(error_at(*pos, format!("expected ';' or '.', found {:?}", other)))
            }
            None => return Err(error_at(*pos, "statement never terminated with '.'".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_statement() {
        let source = r#"
            :subjects a skos:Concept ;
                skos:prefLabel "Subjects" ;
                skos:narrower :houses , :bayous .
        "#;
        let statements = parse_statements(source).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].subject, "subjects");
        assert_eq!(statements[0].pref_label.as_deref(), Some("Subjects"));
        assert_eq!(statements[0].narrower, vec!["houses", "bayous"]);
    }

    #[test]
    fn test_skips_prefix_directives_and_comments() {
        let source = r#"
            @prefix skos: <http://www.w3.org/2004/02/skos/core#> .
            # the only real node
            :houses skos:prefLabel "Houses" .
        "#;
        let statements = parse_statements(source).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].narrower.len(), 0);
    }

    #[test]
    fn test_forward_references_are_tokens_not_errors() {
        let source = r#"
            :root skos:narrower :later .
            :later skos:prefLabel "Later" .
        "#;
        let statements = parse_statements(source).unwrap();
        assert_eq!(statements[0].narrower, vec!["later"]);
        assert_eq!(statements[1].pref_label.as_deref(), Some("Later"));
    }

    #[test]
    fn test_empty_source_is_distinguished() {
        assert!(matches!(parse_statements(""), Err(VocabError::Empty)));
        assert!(matches!(
            parse_statements("# just a comment\n"),
            Err(VocabError::Empty)
        ));
    }

    #[test]
    fn test_malformed_statement_reports_line() {
        let source = ":dangling skos:prefLabel \"oops\"";
        match parse_statements(source) {
            Err(VocabError::Parse { line, message }) => {
                assert_eq!(line, 1);
                assert!(message.contains("never terminated"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_language_tagged_literals() {
        let source = ":houses skos:prefLabel \"Houses\"@en .";
        let statements = parse_statements(source).unwrap();
        assert_eq!(statements[0].pref_label.as_deref(), Some("Houses"));
    }
}
