use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown channel {0:?}")]
pub struct UnknownChannel(pub String);

/// One of the three measurement series stored with every point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Temperature,
    Humidity,
    ApparentTemperature,
}

impl Channel {
    pub const ALL: [Channel; 3] = [
        Channel::Temperature,
        Channel::Humidity,
        Channel::ApparentTemperature,
    ];

    /// Column in the `points` table. Only ever one of three fixed names,
    /// so it is safe to splice into SQL.
    pub fn column(self) -> &'static str {
        match self {
            Channel::Temperature => "channel_1",
            Channel::Humidity => "channel_2",
            Channel::ApparentTemperature => "channel_3",
        }
    }

    /// Identifier used by the HTTP API.
    pub fn field_name(self) -> &'static str {
        match self {
            Channel::Temperature => "field1",
            Channel::Humidity => "field2",
            Channel::ApparentTemperature => "field3",
        }
    }
}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.field_name() == s || channel.column() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_field_names_and_column_aliases() {
        assert_eq!("field1".parse(), Ok(Channel::Temperature));
        assert_eq!("field2".parse(), Ok(Channel::Humidity));
        assert_eq!("channel_3".parse(), Ok(Channel::ApparentTemperature));
    }

    #[test]
    fn rejects_anything_else() {
        assert_eq!(
            "field4".parse::<Channel>(),
            Err(UnknownChannel("field4".into()))
        );
        assert!("".parse::<Channel>().is_err());
        assert!("FIELD1".parse::<Channel>().is_err());
        assert!("timestamp".parse::<Channel>().is_err());
    }
}
