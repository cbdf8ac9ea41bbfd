pub mod lexeme;
