use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

use crate::{configuration::EmailClientConfig, domain::UserEmail};

#[derive(Clone)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: Url,
    sender: UserEmail,
    authorization_token: Secret<String>,
    timeout: Duration,
}

impl EmailClient {
    pub fn new(config: EmailClientConfig) -> Self {
        let timeout = config.timeout();
        Self {
            http_client: reqwest::Client::new(),
            base_url: config.base_url.into(),
            sender: config.sender,
            authorization_token: config.authorization_token,
            timeout,
        }
    }

    pub async fn send_email(
        &self,
        recipient: &UserEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), reqwest::Error> {
        let url = self.base_url.join("/email").unwrap();
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            subject,
            html_body: html_content,
            text_body: text_content,
        };
        self.http_client
            .post(url)
            .timeout(self.timeout)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?
            .error_for_status()
            .map(|_| ())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

#[cfg(test)]
mod tests {
    use fake::{
        faker::{
            internet::en::SafeEmail,
            lorem::en::{Paragraph, Sentence},
        },
        Fake, Faker,
    };
    use wiremock::{
        matchers::{any, header, header_exists, method, path},
        Mock, MockServer, Request, ResponseTemplate,
    };

    use super::*;

    struct SendEmailBodyMatcher;

    impl wiremock::Match for SendEmailBodyMatcher {
        fn matches(&self, request: &Request) -> bool {
            serde_json::from_slice::<serde_json::Value>(&request.body)
                .map(|body| {
                    body.get("From").is_some()
                        && body.get("To").is_some()
                        && body.get("Subject").is_some()
                        && body.get("HtmlBody").is_some()
                        && body.get("TextBody").is_some()
                })
                .unwrap_or(false)
        }
    }

    fn email_client(base_url: String) -> EmailClient {
        email_client_with_timeout(base_url, Duration::from_millis(200))
    }

    fn email_client_with_timeout(base_url: String, timeout: Duration) -> EmailClient {
        let sender = UserEmail::try_from(SafeEmail().fake::<String>()).unwrap();
        EmailClient {
            http_client: reqwest::Client::new(),
            base_url: Url::parse(&base_url).unwrap(),
            sender,
            authorization_token: Secret::new(Faker.fake()),
            timeout,
        }
    }

    fn email() -> UserEmail {
        UserEmail::try_from(SafeEmail().fake::<String>()).unwrap()
    }

    fn subject() -> String {
        Sentence(1..2).fake()
    }

    fn content() -> String {
        Paragraph(1..10).fake()
    }

    #[tokio::test]
    async fn send_email_sends_the_expected_request() {
        let mock_server = MockServer::start().await;
        let email_client = email_client(mock_server.uri());

        Mock::given(header_exists("X-Postmark-Server-Token"))
            .and(header("Content-Type", "application/json"))
            .and(path("/email"))
            .and(method("POST"))
            .and(SendEmailBodyMatcher)
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = email_client
            .send_email(&email(), &subject(), &content(), &content())
            .await;

        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn send_email_fails_if_the_server_returns_500() {
        let mock_server = MockServer::start().await;
        let email_client = email_client(mock_server.uri());

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = email_client
            .send_email(&email(), &subject(), &content(), &content())
            .await;

        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn send_email_times_out_if_the_server_takes_too_long() {
        let mock_server = MockServer::start().await;
        let email_client =
            email_client_with_timeout(mock_server.uri(), Duration::from_millis(100));

        let response = ResponseTemplate::new(200).set_delay(Duration::from_secs(180));
        Mock::given(any())
            .respond_with(response)
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = email_client
            .send_email(&email(), &subject(), &content(), &content())
            .await;

        assert!(outcome.is_err());
    }
}
