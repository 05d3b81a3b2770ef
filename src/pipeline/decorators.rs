// In: src/pipeline/decorators.rs

//! Decorator kernels: newline normalization and XML escaping.
//!
//! Decorators see the decoded scalar stream of the stage they are anchored to
//! and push zero or more scalars per input scalar. Only `UniversalNewline`
//! carries state between calls (whether the last scalar was a CR); `XmlAttr`
//! remembers whether its quotes have been emitted.

use crate::pipeline::models::DecoratorKind;
use crate::registry::CodecRegistry;
use crate::types::EncodingDescriptor;
use crate::utils::hex_charref;

#[derive(Debug, Clone)]
pub struct Decorator {
    kind: DecoratorKind,
    /// The pipeline's final encoding, consulted by the XML escapes.
    destination: EncodingDescriptor,
    saw_cr: bool,
    attr_opened: bool,
    attr_closed: bool,
}

impl Decorator {
    pub fn new(kind: DecoratorKind, destination: EncodingDescriptor) -> Self {
        Self {
            kind,
            destination,
            saw_cr: false,
            attr_opened: false,
            attr_closed: false,
        }
    }

    pub fn kind(&self) -> DecoratorKind {
        self.kind
    }

    /// Transforms one scalar, appending the result to `out`.
    pub fn feed(&mut self, ch: char, registry: &dyn CodecRegistry, out: &mut Vec<char>) {
        match self.kind {
            DecoratorKind::UniversalNewline => {
                let after_cr = std::mem::replace(&mut self.saw_cr, ch == '\r');
                match ch {
                    '\r' => out.push('\n'),
                    '\n' if after_cr => {}
                    _ => out.push(ch),
                }
            }
            DecoratorKind::CrlfNewline => match ch {
                '\n' => out.extend(['\r', '\n']),
                _ => out.push(ch),
            },
            DecoratorKind::CrNewline => match ch {
                '\n' => out.push('\r'),
                _ => out.push(ch),
            },
            DecoratorKind::XmlText => self.escape(ch, false, registry, out),
            DecoratorKind::XmlAttr => {
                if !self.attr_opened {
                    self.attr_opened = true;
                    out.push('"');
                }
                self.escape(ch, true, registry, out)
            }
        }
    }

    /// Emits whatever the end of the stream requires (the closing attribute quote).
    /// Calling it more than once emits nothing further.
    pub fn finish(&mut self, out: &mut Vec<char>) {
        self.saw_cr = false;
        if self.kind == DecoratorKind::XmlAttr && !self.attr_closed {
            if !self.attr_opened {
                self.attr_opened = true;
                out.push('"');
            }
            self.attr_closed = true;
            out.push('"');
        }
    }

    fn escape(&self, ch: char, quote: bool, registry: &dyn CodecRegistry, out: &mut Vec<char>) {
        let entity = match ch {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' if quote => "&quot;",
            _ if ch.is_ascii() || registry.is_representable(&self.destination, ch) => {
                out.push(ch);
                return;
            }
            _ => {
                out.extend(hex_charref(ch).chars());
                return;
            }
        };
        out.extend(entity.chars());
    }
}

/// Runs `ch` through a chain of decorators, appending the final scalars to `out`.
pub fn feed_chain(decorators: &mut [Decorator], ch: char, registry: &dyn CodecRegistry, out: &mut Vec<char>) {
    let Some((first, rest)) = decorators.split_first_mut() else {
        out.push(ch);
        return;
    };
    let mut produced = Vec::with_capacity(4);
    first.feed(ch, registry, &mut produced);
    for c in produced {
        feed_chain(rest, c, registry, out);
    }
}

/// Finishes a chain of decorators in order; what an earlier decorator emits at
/// finish still runs through the later ones.
pub fn finish_chain(decorators: &mut [Decorator], registry: &dyn CodecRegistry, out: &mut Vec<char>) {
    for i in 0..decorators.len() {
        let mut produced = Vec::new();
        decorators[i].finish(&mut produced);
        let rest = &mut decorators[i + 1..];
        for c in produced {
            feed_chain(rest, c, registry, out);
        }
    }
}
