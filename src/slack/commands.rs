//! Slack slash command router.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackClient, SlackClientEventsUserState, SlackClientHyperHttpsConnector, SlackCommandEvent,
    SlackCommandEventResponse, SlackMessageContent, SlackMessageResponseType,
};
use tracing::{error, info, warn};

use crate::queue::{CommandInput, SharedInvocation};
use crate::slack::invocation::SlackInvocation;
use crate::state::AppState;

/// Handle incoming slash commands routed via Socket Mode.
///
/// The returned response is Slack's synchronous ack. Real output arrives
/// later through the command's `response_url`; only admission failures are
/// reported inline.
///
/// # Errors
///
/// Returns an error if the command response cannot be constructed.
pub async fn handle_command(
    event: SlackCommandEvent,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    state: SlackClientEventsUserState,
) -> slack_morphism::AnyStdResult<SlackCommandEventResponse> {
    info!(
        command = ?event.command,
        user = ?event.user_id,
        channel = ?event.channel_id,
        "received slash command"
    );

    let app_state: Option<Arc<AppState>> = {
        let guard = state.read().await;
        guard.get_user_state::<Arc<AppState>>().cloned()
    };
    let Some(app) = app_state else {
        warn!("app state not available; cannot process command");
        return Ok(ephemeral_response(Some(
            "> **Error: The bot is still starting, please try again.**".into(),
        )));
    };

    let input = CommandInput::new(
        &event.command.0,
        event.text.clone().unwrap_or_default(),
        event.user_id.to_string(),
        event.channel_id.to_string(),
    );

    let invocation: SharedInvocation = match SlackInvocation::from_command_event(
        &event,
        app.http.clone(),
        Arc::clone(&app.visibility),
    ) {
        Ok(invocation) => Arc::new(invocation),
        Err(err) => {
            error!(%err, "cannot build invocation for slash command");
            return Ok(ephemeral_response(Some(format!("> **Error: {err}**"))));
        }
    };

    match app.registry.dispatch(invocation, input).await {
        Ok(()) => Ok(ephemeral_response(None)),
        Err(err) => {
            warn!(command = ?event.command, %err, "slash command rejected");
            Ok(ephemeral_response(Some(format!("> **Error: {err}**"))))
        }
    }
}

fn ephemeral_response(text: Option<String>) -> SlackCommandEventResponse {
    SlackCommandEventResponse {
        content: SlackMessageContent {
            text,
            markdown_text: None,
            blocks: None,
            attachments: None,
            upload: None,
            files: None,
            reactions: None,
            metadata: None,
        },
        response_type: Some(SlackMessageResponseType::Ephemeral),
    }
}
