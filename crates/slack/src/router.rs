use std::sync::Arc;

use async_trait::async_trait;

use heymoji_core::domain::command::CommandKind;
use heymoji_core::errors::DispatchError;

use crate::blocks::MessageTemplate;
use crate::commands::{CommandAttributes, CommandKeyword};
use crate::events::{EventContext, MentionEvent};

/// Uniform signature shared by every command. A returned message is posted to
/// the channel the mention came from.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        attributes: &CommandAttributes,
        event: &MentionEvent,
        ctx: &EventContext,
    ) -> Result<Option<MessageTemplate>, DispatchError>;
}

#[derive(Clone)]
pub struct HandlerBinding {
    pub kind: CommandKind,
    pub handler: Arc<dyn CommandHandler>,
}

/// Fixed command table with exactly one binding per [`CommandKind`].
#[derive(Clone)]
pub struct CommandRouter {
    bindings: [HandlerBinding; 6],
}

impl CommandRouter {
    pub fn build<F>(mut handler_for: F) -> Self
    where
        F: FnMut(CommandKind) -> Arc<dyn CommandHandler>,
    {
        let bindings = CommandKind::ALL.map(|kind| HandlerBinding { kind, handler: handler_for(kind) });
        Self { bindings }
    }

    pub fn resolve(&self, keyword: &CommandKeyword) -> Option<&HandlerBinding> {
        match keyword {
            CommandKeyword::Known(kind) => Some(&self.bindings[kind.index()]),
            CommandKeyword::Unrecognized(_) => None,
        }
    }

    pub fn bindings(&self) -> &[HandlerBinding] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use heymoji_core::domain::command::CommandKind;
    use heymoji_core::errors::DispatchError;

    use super::{CommandHandler, CommandRouter};
    use crate::blocks::{MessageBuilder, MessageTemplate};
    use crate::commands::{CommandAttributes, CommandKeyword};
    use crate::events::{EventContext, MentionEvent};

    struct LabelHandler(CommandKind);

    #[async_trait]
    impl CommandHandler for LabelHandler {
        async fn handle(
            &self,
            _attributes: &CommandAttributes,
            _event: &MentionEvent,
            _ctx: &EventContext,
        ) -> Result<Option<MessageTemplate>, DispatchError> {
            Ok(Some(MessageBuilder::new(self.0.label()).build()))
        }
    }

    fn router() -> CommandRouter {
        CommandRouter::build(|kind| Arc::new(LabelHandler(kind)))
    }

    #[test]
    fn every_kind_resolves_to_its_own_binding() {
        let router = router();
        assert_eq!(router.bindings().len(), CommandKind::ALL.len());

        for kind in CommandKind::ALL {
            let binding = router.resolve(&CommandKeyword::Known(kind)).expect("binding");
            assert_eq!(binding.kind, kind);
        }
    }

    #[test]
    fn unrecognized_keyword_has_no_binding() {
        let router = router();
        assert!(router.resolve(&CommandKeyword::Unrecognized("frobnicate".to_string())).is_none());
        assert!(router.resolve(&CommandKeyword::Unrecognized(String::new())).is_none());
    }
}
