use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::daily_tally::DailyTally;

/// Body accepted by the push-messaging API: a destination group plus a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMessage {
    pub group_id: String,
    pub msg_type: String,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub header: CardHeader,
    pub elements: Vec<CardElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardHeader {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum CardElement {
    Field { label: String, value: String },
    Divider,
    Note { text: String },
}

/// "Monday, 5 January 2026"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %-d %B %Y").to_string()
}

fn field(label: &str, value: usize) -> CardElement {
    CardElement::Field {
        label: label.to_string(),
        value: value.to_string(),
    }
}

pub fn build_card(date: NaiveDate, tally: &DailyTally, group_id: &str) -> CardMessage {
    CardMessage {
        group_id: group_id.to_string(),
        msg_type: "card".to_string(),
        card: Card {
            header: CardHeader {
                title: "Daily Attendance Report".to_string(),
                subtitle: long_date(date),
            },
            elements: vec![
                field("Total employees", tally.total),
                CardElement::Divider,
                field("Present", tally.present),
                field("Late", tally.late),
                field("On leave", tally.leave),
                field("Absent", tally.absent),
                CardElement::Divider,
                CardElement::Note {
                    text: "Late arrivals are included in the present count.".to_string(),
                },
            ],
        },
    }
}
