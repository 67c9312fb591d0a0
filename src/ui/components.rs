/// Reusable UI components

use patternfly_yew::prelude::*;
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatusKind {
    Success,
    Error,
}

/// A one-line result message on the options page
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusBannerProps {
    #[prop_or_default]
    pub status: Option<StatusMessage>,
}

#[function_component(StatusBanner)]
pub fn status_banner(props: &StatusBannerProps) -> Html {
    let Some(status) = &props.status else {
        return html! {};
    };

    let alert_type = match status.kind {
        StatusKind::Success => AlertType::Success,
        StatusKind::Error => AlertType::Danger,
    };

    html! {
        <div class="status-message">
            <Alert r#type={alert_type} title={status.text.clone()} inline={true}>
            </Alert>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct DomainRowProps {
    pub url: String,
    #[prop_or(false)]
    pub is_default: bool,
    #[prop_or_default]
    pub on_remove: Callback<String>,
}

/// One eligible domain; the default row gets a badge instead of a button
#[function_component(DomainRow)]
pub fn domain_row(props: &DomainRowProps) -> Html {
    let on_click = {
        let url = props.url.clone();
        let on_remove = props.on_remove.clone();
        Callback::from(move |_: MouseEvent| on_remove.emit(url.clone()))
    };

    html! {
        <div class={classes!("domain-item", props.is_default.then_some("default"))}>
            <span class="domain-url">{&props.url}</span>
            if props.is_default {
                <span class="domain-badge">{"Default"}</span>
            } else {
                <Button onclick={on_click} variant={ButtonVariant::Danger}>
                    {"Remove"}
                </Button>
            }
        </div>
    }
}
