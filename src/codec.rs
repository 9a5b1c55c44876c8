// Bracketed text format:
//
//   tree  := '[' ( node ( ',' node )* )? ']'
//   node  := '{' value ( ',' '[' node ( ',' node )* ']' )? '}'
//
// A tree has at most one node in its outer list. Whitespace is allowed
// between tokens when reading and never written.

use std::fmt;
use std::io;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::arena::NodeId;
use crate::error::{Error, Result};
use crate::tree::Tree;

/// Text representation of a payload inside the tree format.
pub trait TextValue: Sized{
    fn write_text<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result;

    /// Parses a value at the start of `input`, returning it with the
    /// remaining input, or `None` if no valid value starts there.
    fn parse_text(input: &str) -> Option<(Self, &str)>;
}

fn is_delimiter(c: char) -> bool{
    c.is_whitespace() || c == ',' || c == '{' || c == '}' || c == '[' || c == ']'
}

macro_rules! impl_text_value_from_str {
    ($($t: ty),*) => {
        $(
            impl TextValue for $t{
                fn write_text<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result{
                    write!(out, "{}", self)
                }

                fn parse_text(input: &str) -> Option<($t, &str)>{
                    let end = input.find(is_delimiter).unwrap_or_else(|| input.len());
                    input[..end].parse().ok().map(|value| (value, &input[end..]))
                }
            }
        )*
    }
}

impl_text_value_from_str!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool);

fn write_escaped<W: fmt::Write + ?Sized>(c: char, quote: char, out: &mut W) -> fmt::Result{
    match c {
        '\\' => out.write_str("\\\\"),
        '\n' => out.write_str("\\n"),
        '\r' => out.write_str("\\r"),
        '\t' => out.write_str("\\t"),
        c if c == quote => {
            out.write_char('\\')?;
            out.write_char(c)
        }
        c => out.write_char(c),
    }
}

// Reads one possibly escaped char, returning it and the bytes it used.
fn read_escaped(input: &str) -> Option<(char, usize)>{
    let mut chars = input.chars();
    match chars.next()? {
        '\\' => {
            let c = match chars.next()? {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                c @ '\\' | c @ '"' | c @ '\'' => c,
                _ => return None,
            };
            Some((c, 2))
        }
        c => Some((c, c.len_utf8())),
    }
}

impl TextValue for String{
    fn write_text<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result{
        out.write_char('"')?;
        for c in self.chars() {
            write_escaped(c, '"', out)?;
        }
        out.write_char('"')
    }

    fn parse_text(input: &str) -> Option<(String, &str)>{
        let mut rest = input.strip_prefix('"')?;
        let mut value = String::new();
        loop {
            if let Some(rest) = rest.strip_prefix('"') {
                return Some((value, rest));
            }
            let (c, len) = read_escaped(rest)?;
            value.push(c);
            rest = &rest[len..];
        }
    }
}

impl TextValue for char{
    fn write_text<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result{
        out.write_char('\'')?;
        write_escaped(*self, '\'', out)?;
        out.write_char('\'')
    }

    fn parse_text(input: &str) -> Option<(char, &str)>{
        let rest = input.strip_prefix('\'')?;
        let (c, len) = read_escaped(rest)?;
        rest[len..].strip_prefix('\'').map(|rest| (c, rest))
    }
}

/// Insertion mode of the next node read.
#[derive(Clone, Copy)]
enum Insert{
    Root,
    Child(NodeId),
    Sibling(NodeId),
}

struct Scanner<'a>{
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a>{
    fn new(input: &'a str) -> Scanner<'a>{
        Scanner{ input, pos: 0 }
    }

    fn rest(&self) -> &'a str{
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self){
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char>{
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn token(&mut self, expected: &'static str) -> Result<(usize, char)>{
        match self.peek() {
            Some(c) => {
                let offset = self.pos;
                self.pos += c.len_utf8();
                Ok((offset, c))
            }
            None => Err(Error::UnexpectedEof{ expected }),
        }
    }

    fn expect(&mut self, token: char, expected: &'static str) -> Result<()>{
        match self.token(expected)? {
            (_, c) if c == token => Ok(()),
            (offset, found) => Err(Error::UnexpectedToken{ offset, expected, found }),
        }
    }

    fn value<T: TextValue>(&mut self) -> Result<T>{
        self.skip_whitespace();
        let rest = self.rest();
        match T::parse_text(rest) {
            Some((value, tail)) => {
                self.pos += rest.len() - tail.len();
                Ok(value)
            }
            None if rest.is_empty() => Err(Error::UnexpectedEof{ expected: "a value" }),
            None => Err(Error::InvalidValue{ offset: self.pos }),
        }
    }
}

impl<T: TextValue> Tree<T>{
    /// Writes the tree in the bracketed text format.
    pub fn write_text<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result{
        self.write_with(out, |value, out| value.write_text(out))
    }

    pub fn write_to<W: io::Write>(&self, mut out: W) -> io::Result<()>{
        write!(out, "{}", self)
    }

    /// Replaces the contents of the tree with the one serialized at the start
    /// of `input`, returning the input left after it.
    ///
    /// On error the tree is left empty.
    pub fn parse<'a>(&mut self, input: &'a str) -> Result<&'a str>{
        self.reset();
        let mut scanner = Scanner::new(input);
        match self.build(&mut scanner) {
            Ok(()) => Ok(scanner.rest()),
            Err(err) => {
                debug!("discarding partially parsed tree: {}", err);
                self.reset();
                Err(err)
            }
        }
    }

    /// Replaces the contents of the tree with the one read from `input`.
    /// Anything but whitespace after the tree is an error.
    pub fn read_from<R: io::Read>(&mut self, mut input: R) -> Result<()>{
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        self.parse_all(&text)
    }

    fn parse_all(&mut self, text: &str) -> Result<()>{
        let rest = self.parse(text)?;
        let trailing = rest.trim_start();
        if trailing.is_empty() {
            Ok(())
        }else{
            self.reset();
            Err(Error::TrailingInput{ offset: text.len() - trailing.len() })
        }
    }

    fn build(&mut self, scanner: &mut Scanner<'_>) -> Result<()>{
        scanner.expect('[', "'['")?;
        if scanner.peek() == Some(']') {
            scanner.pos += 1;
            return Ok(());
        }

        let mut open: SmallVec<[NodeId; 16]> = SmallVec::new();
        let mut mode = Insert::Root;
        loop {
            scanner.expect('{', "'{'")?;
            let value = scanner.value::<T>()?;
            let id = match mode {
                Insert::Root => self.set_root(value),
                Insert::Child(parent) => self.insert_child(parent, value),
                Insert::Sibling(previous) => self.insert_right(previous, value)?,
            };

            match scanner.token("',' or '}'")? {
                (_, ',') => {
                    scanner.expect('[', "'['")?;
                    open.push(id);
                    mode = Insert::Child(id);
                    continue;
                }
                (_, '}') => (),
                (offset, found) => return Err(Error::UnexpectedToken{ offset, expected: "',' or '}'", found }),
            }

            let mut closed = id;
            loop {
                match scanner.token("',' or ']'")? {
                    (offset, ',') => {
                        if open.is_empty() {
                            return Err(Error::UnexpectedToken{ offset, expected: "']'", found: ',' });
                        }
                        mode = Insert::Sibling(closed);
                        break;
                    }
                    (_, ']') => match open.pop() {
                        Some(parent) => {
                            scanner.expect('}', "'}'")?;
                            closed = parent;
                        }
                        None => return Ok(()),
                    },
                    (offset, found) => return Err(Error::UnexpectedToken{ offset, expected: "',' or ']'", found }),
                }
            }
        }
    }
}

impl<T: TextValue> fmt::Display for Tree<T>{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result{
        self.write_text(f)
    }
}

impl<T: TextValue> FromStr for Tree<T>{
    type Err = Error;

    fn from_str(text: &str) -> Result<Tree<T>>{
        let mut tree = Tree::new();
        tree.parse_all(text)?;
        Ok(tree)
    }
}
