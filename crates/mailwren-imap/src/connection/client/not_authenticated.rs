//! Implementation for the not-authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};

use mailwren_oauth::sasl::{ErrorChallenge, parse_error_challenge};

use super::Client;
use super::states::{Authenticated, NotAuthenticated};
use crate::command::{Command, TagGenerator};
use crate::connection::framed::FramedStream;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{ResponseCode, Status};
use crate::{Error, Result};

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new client from a connected stream.
    ///
    /// Reads the server greeting and any capabilities it carries.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut framed = FramedStream::new(stream);

        let greeting = framed.read_response().await?;
        let response = ResponseParser::parse(&greeting)?;

        let mut capabilities = Vec::new();
        if let Response::Untagged(untagged) = response {
            match untagged {
                UntaggedResponse::Ok {
                    code: Some(ResponseCode::Capability(caps)),
                    ..
                }
                | UntaggedResponse::PreAuth {
                    code: Some(ResponseCode::Capability(caps)),
                    ..
                } => {
                    capabilities = caps;
                }
                UntaggedResponse::Bye { text, .. } => {
                    return Err(Error::Bye(text));
                }
                _ => {}
            }
        }

        Ok(Self {
            stream: framed,
            tag_gen: TagGenerator::default(),
            capabilities,
            state: NotAuthenticated,
        })
    }

    /// Authenticates with the server using LOGIN.
    ///
    /// Consumes self and returns an authenticated client on success.
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        let tag = self.tag_gen.next();
        let cmd = Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        self.absorb_capabilities(&responses);

        Self::check_tagged_ok(&responses, &tag)
            .map_err(|e| Error::Auth(format!("LOGIN rejected: {e}")))?;

        Ok(Client {
            stream: self.stream,
            tag_gen: self.tag_gen,
            capabilities: self.capabilities,
            state: Authenticated,
        })
    }

    /// Authenticates using the XOAUTH2 SASL mechanism.
    ///
    /// `initial_response` is the base64-framed XOAUTH2 payload. Consumes
    /// self and returns an authenticated client on success.
    ///
    /// Servers reject a bad token by sending a continuation whose base64
    /// body is a JSON error challenge. The exchange is then cancelled with
    /// `*` and the tagged rejection is surfaced with the challenge's
    /// status/scope/schemes diagnostics.
    pub async fn authenticate_xoauth2(
        mut self,
        initial_response: &str,
    ) -> Result<Client<S, Authenticated>> {
        let tag = self.tag_gen.next();
        let cmd = Command::Authenticate {
            mechanism: "XOAUTH2".to_string(),
            initial_response: Some(initial_response.to_string()),
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let mut challenge: Option<ErrorChallenge> = None;

        loop {
            let response_bytes = self.stream.read_response().await?;
            match ResponseParser::parse(&response_bytes) {
                Ok(Response::Continuation { text }) => {
                    if let Some(parsed) = text.as_deref().and_then(parse_error_challenge) {
                        tracing::warn!(
                            status = %parsed.status,
                            scope = parsed.scope.as_deref().unwrap_or("<none>"),
                            "SASL error challenge received"
                        );
                        challenge = Some(parsed);
                    }
                    // XOAUTH2 has no second step; cancel the exchange and
                    // let the server report the failure on the tag.
                    self.stream.write_command(b"*\r\n").await?;
                }
                Ok(Response::Tagged {
                    tag: resp_tag,
                    status,
                    text,
                    ..
                }) if resp_tag.as_str() == tag => {
                    return match status {
                        Status::Ok | Status::PreAuth => Ok(Client {
                            stream: self.stream,
                            tag_gen: self.tag_gen,
                            capabilities: self.capabilities,
                            state: Authenticated,
                        }),
                        Status::Bye => Err(Error::Bye(text)),
                        Status::No | Status::Bad => Err(Self::xoauth2_error(&text, challenge)),
                    };
                }
                Ok(Response::Untagged(UntaggedResponse::Capability(caps))) => {
                    self.capabilities = caps;
                }
                Ok(Response::Untagged(UntaggedResponse::Bye { text, .. })) => {
                    return Err(Error::Bye(text));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unparseable line during AUTHENTICATE");
                }
            }
        }
    }

    /// Builds the richest available authentication error.
    fn xoauth2_error(text: &str, challenge: Option<ErrorChallenge>) -> Error {
        match challenge {
            Some(ch) => Error::Auth(format!(
                "XOAUTH2 rejected ({}): {text}; the token is expired, lacks the required \
                 scope, or is bound to another identity. Obtain a new token and re-authenticate",
                ch.describe()
            )),
            None => Error::Auth(format!("XOAUTH2 authentication failed: {text}")),
        }
    }

    /// Updates capabilities from untagged CAPABILITY lines.
    fn absorb_capabilities(&mut self, responses: &[Vec<u8>]) {
        for response_bytes in responses {
            if let Ok(Response::Untagged(UntaggedResponse::Capability(caps))) =
                ResponseParser::parse(response_bytes)
            {
                self.capabilities = caps;
            }
        }
    }
}
