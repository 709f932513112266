/// The lexical units of the language.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    EndOfInput,

    // Commands.
    Def,
    Extern,

    // Primary.
    Identifier(String),
    Number(f64),

    // Any other character: operators, parentheses, comma ...
    Symbol(char),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::EndOfInput => write!(f, "end of input"),

            // Commands.
            Token::Def => write!(f, "def"),
            Token::Extern => write!(f, "extern"),

            // Primary.
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Number(n) => write!(f, "{}", n),

            Token::Symbol(c) => write!(f, "{}", c),
        }
    }
}
