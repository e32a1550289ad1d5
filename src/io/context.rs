use super::State;
use smallvec::SmallVec;

/// The kinds of open containers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ContextType {
    Document,
    EmbeddedDocument,
    Array,
    JavaScriptWithScope,
    ScopeDocument,
}

impl ContextType {
    /// The state while a context of this kind is innermost.
    pub(crate) fn state(self) -> State {
        match self {
            ContextType::Document => State::Document,
            ContextType::EmbeddedDocument => State::EmbeddedDocument,
            ContextType::Array => State::Array,
            ContextType::JavaScriptWithScope => State::JavaScriptWithScope,
            ContextType::ScopeDocument => State::ScopeDocument,
        }
    }
}

/// An open container of the binary format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Context {
    pub(crate) kind: ContextType,
    /// Offset of the length field.
    pub(crate) start: usize,
    /// Declared length. Unused by the writer, which backpatches instead.
    pub(crate) size: usize,
}

/// An open container of the JSON format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct JsonContext {
    pub(crate) kind: ContextType,
    pub(crate) indentation: String,
    pub(crate) has_elements: bool,
}

/// The stack of open containers. The parent of a context is the one below it.
#[derive(Clone, Debug)]
pub(crate) struct ContextStack<C> {
    stack: SmallVec<[C; 8]>,
}

impl<C> ContextStack<C> {
    pub(crate) fn new() -> Self {
        ContextStack {
            stack: SmallVec::new(),
        }
    }

    pub(crate) fn push(&mut self, context: C) { self.stack.push(context) }

    pub(crate) fn pop(&mut self) -> Option<C> { self.stack.pop() }

    pub(crate) fn top(&self) -> Option<&C> { self.stack.last() }

    pub(crate) fn top_mut(&mut self) -> Option<&mut C> { self.stack.last_mut() }

    /// The context below the top one.
    pub(crate) fn parent(&self) -> Option<&C> {
        let len = self.stack.len();
        if len < 2 {
            None
        } else {
            self.stack.get(len - 2)
        }
    }

    pub(crate) fn depth(&self) -> usize { self.stack.len() }

    pub(crate) fn clear(&mut self) { self.stack.clear() }
}
