//! The Bot API method registry.
//!
//! Each entry of the `bot_methods!` table produces:
//! - an async method on [`RawApi`] named after the method in snake case,
//!   taking the arguments and an optional abort signal and returning the
//!   unwrapped `result`;
//! - a [`MethodInfo`] record in [`METHODS`].
//!
//! Methods missing from the table can still be called with
//! [`RawApi::call`].

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::RawApi;
use crate::error::CallResult;
use crate::payload::Payload;

/// What a method's `result` can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    /// Always `true` on success.
    True,
    /// An object, array or scalar worth reading.
    Data,
}

/// Static description of one Bot API method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    /// Wire name, e.g. `sendMessage`.
    pub name: &'static str,
    pub returns: Returns,
}

macro_rules! bot_methods {
    ($( $fn_name:ident => $wire:literal : $returns:ident ),* $(,)?) => {
        /// Every method with a typed entry point, in declaration order.
        pub static METHODS: &[MethodInfo] = &[
            $( MethodInfo { name: $wire, returns: Returns::$returns }, )*
        ];

        impl RawApi {
            $(
                #[doc = concat!("Calls `", $wire, "`.")]
                pub async fn $fn_name(
                    &self,
                    payload: Payload,
                    signal: Option<CancellationToken>,
                ) -> CallResult<Value> {
                    self.call($wire, payload, signal).await
                }
            )*
        }
    };
}

bot_methods! {
    get_updates => "getUpdates": Data,
    set_webhook => "setWebhook": True,
    delete_webhook => "deleteWebhook": True,
    get_webhook_info => "getWebhookInfo": Data,
    get_me => "getMe": Data,
    log_out => "logOut": True,
    close => "close": True,
    send_message => "sendMessage": Data,
    forward_message => "forwardMessage": Data,
    copy_message => "copyMessage": Data,
    send_photo => "sendPhoto": Data,
    send_audio => "sendAudio": Data,
    send_document => "sendDocument": Data,
    send_video => "sendVideo": Data,
    send_animation => "sendAnimation": Data,
    send_voice => "sendVoice": Data,
    send_video_note => "sendVideoNote": Data,
    send_media_group => "sendMediaGroup": Data,
    send_location => "sendLocation": Data,
    send_venue => "sendVenue": Data,
    send_contact => "sendContact": Data,
    send_poll => "sendPoll": Data,
    send_dice => "sendDice": Data,
    send_sticker => "sendSticker": Data,
    send_chat_action => "sendChatAction": True,
    set_message_reaction => "setMessageReaction": True,
    get_user_profile_photos => "getUserProfilePhotos": Data,
    get_file => "getFile": Data,
    ban_chat_member => "banChatMember": True,
    unban_chat_member => "unbanChatMember": True,
    restrict_chat_member => "restrictChatMember": True,
    promote_chat_member => "promoteChatMember": True,
    approve_chat_join_request => "approveChatJoinRequest": True,
    decline_chat_join_request => "declineChatJoinRequest": True,
    export_chat_invite_link => "exportChatInviteLink": Data,
    set_chat_photo => "setChatPhoto": True,
    delete_chat_photo => "deleteChatPhoto": True,
    set_chat_title => "setChatTitle": True,
    set_chat_description => "setChatDescription": True,
    pin_chat_message => "pinChatMessage": True,
    unpin_chat_message => "unpinChatMessage": True,
    unpin_all_chat_messages => "unpinAllChatMessages": True,
    leave_chat => "leaveChat": True,
    get_chat => "getChat": Data,
    get_chat_administrators => "getChatAdministrators": Data,
    get_chat_member_count => "getChatMemberCount": Data,
    get_chat_member => "getChatMember": Data,
    answer_callback_query => "answerCallbackQuery": True,
    set_my_commands => "setMyCommands": True,
    delete_my_commands => "deleteMyCommands": True,
    get_my_commands => "getMyCommands": Data,
    edit_message_text => "editMessageText": Data,
    edit_message_caption => "editMessageCaption": Data,
    edit_message_reply_markup => "editMessageReplyMarkup": Data,
    stop_poll => "stopPoll": Data,
    delete_message => "deleteMessage": True,
    delete_messages => "deleteMessages": True,
    answer_inline_query => "answerInlineQuery": True,
    send_invoice => "sendInvoice": Data,
    answer_shipping_query => "answerShippingQuery": True,
    answer_pre_checkout_query => "answerPreCheckoutQuery": True,
}

/// Looks up a method by wire name.
pub fn lookup(name: &str) -> Option<&'static MethodInfo> {
    METHODS.iter().find(|info| info.name == name)
}

/// Whether `name` is a registry method that only ever returns `true`.
pub fn returns_true(name: &str) -> bool {
    lookup(name).is_some_and(|info| info.returns == Returns::True)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("getMe").map(|m| m.returns), Some(Returns::Data));
        assert_eq!(
            lookup("sendChatAction").map(|m| m.returns),
            Some(Returns::True)
        );
        assert!(lookup("getMee").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = METHODS.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), METHODS.len());
    }
}
