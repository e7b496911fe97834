// src/source/imports.rs

use std::fmt::Debug;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::CharIndices;

use thiserror::Error;

use crate::fs::FileSystem;

/// Why a file contributed no imports.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("unable to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{path:?}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Extracts the import list of a single source file.
pub trait ImportExtractor: Send + Sync + Debug {
    /// Whether the scanner should hand `file_name` to [`Self::imports`].
    fn is_source(&self, file_name: &str) -> bool;

    /// Imported package paths, in source order.
    fn imports(&self, fs: &dyn FileSystem, path: &Path) -> Result<Vec<String>, ImportError>;
}

/// Reads the package clause and the leading import declarations of `.go`
/// files. Everything after the last import declaration is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoImportExtractor;

impl ImportExtractor for GoImportExtractor {
    fn is_source(&self, file_name: &str) -> bool {
        file_name.ends_with(".go")
    }

    fn imports(&self, fs: &dyn FileSystem, path: &Path) -> Result<Vec<String>, ImportError> {
        let src = fs.read_to_string(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        parse_imports(&src).map_err(|(line, message)| ImportError::Syntax {
            path: path.to_path_buf(),
            line,
            message,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    LParen,
    RParen,
    Dot,
    Other(char),
}

struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    token_line: usize,
}

type LexResult<T> = Result<T, (usize, String)>;

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            line: 1,
            token_line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn error<T>(&self, message: impl Into<String>) -> LexResult<T> {
        Err((self.line, message.into()))
    }

    /// Skip whitespace, semicolons and comments.
    fn skip_trivia(&mut self) -> LexResult<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == ';' => {
                    self.bump();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.peek().map(|&(_, c)| c) {
                        Some('/') => {
                            while let Some(c) = self.bump() {
                                if c == '\n' {
                                    break;
                                }
                            }
                        }
                        Some('*') => {
                            self.bump();
                            self.bump();
                            let mut prev = '\0';
                            loop {
                                match self.bump() {
                                    Some('/') if prev == '*' => break,
                                    Some(c) => prev = c,
                                    None => return self.error("comment not terminated"),
                                }
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> LexResult<Option<Token>> {
        self.skip_trivia()?;
        self.token_line = self.line;

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let token = match c {
            '(' => {
                self.bump();
                Token::LParen
            }
            ')' => {
                self.bump();
                Token::RParen
            }
            '.' => {
                self.bump();
                Token::Dot
            }
            '"' => Token::Str(self.interpreted_string()?),
            '`' => Token::Str(self.raw_string()?),
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(c) = self.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                Token::Ident(ident)
            }
            other => {
                self.bump();
                Token::Other(other)
            }
        };

        Ok(Some(token))
    }

    fn interpreted_string(&mut self) -> LexResult<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return self.error("string literal not terminated"),
                },
                Some('\n') | None => return self.error("string literal not terminated"),
                Some(c) => out.push(c),
            }
        }
    }

    fn raw_string(&mut self) -> LexResult<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('`') => return Ok(out),
                Some(c) => out.push(c),
                None => return self.error("raw string literal not terminated"),
            }
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<Token>,
    /// Line the lookahead token starts on.
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> LexResult<Self> {
        let mut lexer = Lexer::new(src);
        let lookahead = lexer.next_token()?;
        let line = lexer.token_line;
        Ok(Self {
            lexer,
            lookahead,
            line,
        })
    }

    fn advance(&mut self) -> LexResult<Option<Token>> {
        let next = self.lexer.next_token()?;
        self.line = self.lexer.token_line;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn fail<T>(&self, line: usize, message: &str) -> LexResult<T> {
        Err((line, message.to_string()))
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.lookahead, Some(Token::Ident(s)) if s == keyword)
    }

    fn package_clause(&mut self) -> LexResult<()> {
        if !self.at_keyword("package") {
            return self.fail(self.line, "expected 'package'");
        }
        self.advance()?;
        let line = self.line;
        match self.advance()? {
            Some(Token::Ident(_)) => Ok(()),
            _ => self.fail(line, "expected package name"),
        }
    }

    fn import_spec(&mut self, out: &mut Vec<String>) -> LexResult<()> {
        if matches!(self.lookahead, Some(Token::Dot) | Some(Token::Ident(_))) {
            self.advance()?;
        }
        let line = self.line;
        match self.advance()? {
            Some(Token::Str(path)) if path.is_empty() => self.fail(line, "empty import path"),
            Some(Token::Str(path)) => {
                out.push(path);
                Ok(())
            }
            _ => self.fail(line, "expected import path"),
        }
    }

    fn imports(&mut self) -> LexResult<Vec<String>> {
        self.package_clause()?;

        let mut out = Vec::new();
        while self.at_keyword("import") {
            self.advance()?;
            if self.lookahead == Some(Token::LParen) {
                self.advance()?;
                loop {
                    match self.lookahead {
                        Some(Token::RParen) => {
                            self.advance()?;
                            break;
                        }
                        None => return self.fail(self.line, "import block not terminated"),
                        _ => self.import_spec(&mut out)?,
                    }
                }
            } else {
                self.import_spec(&mut out)?;
            }
        }

        Ok(out)
    }
}

/// Parse the imports of a Go source file.
///
/// On failure returns the line number and a message.
pub fn parse_imports(src: &str) -> Result<Vec<String>, (usize, String)> {
    Parser::new(src)?.imports()
}
