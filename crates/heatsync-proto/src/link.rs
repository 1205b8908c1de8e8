//! Direct links to lane pages.

use crate::{
    errors::{ProtocolError, Result},
    ident::{Identifier, LaneNumber},
    pointer::RacePointer,
};

/// Link that opens a lane client already pointed at a race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneLink {
    /// Lane the link opens.
    pub lane: LaneNumber,
    /// Full URL with `lane`, `event` and `heat` parameters.
    pub url: String,
}

impl LaneLink {
    /// Build the link for `lane` on `pointer` under `base`.
    pub fn build(base: &str, lane: LaneNumber, pointer: &RacePointer) -> Self {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("lane", &lane.to_string())
            .append_pair("event", pointer.event.as_str())
            .append_pair("heat", pointer.heat.as_str())
            .finish();
        let separator = if base.contains('?') { '&' } else { '?' };
        Self { lane, url: format!("{base}{separator}{query}") }
    }

    /// Read the lane and race back out of a link.
    ///
    /// Only the query is looked at. The last `lane`, `event` and `heat`
    /// win, since [`Self::build`] appends them after any query the base
    /// already carries. A race needs both parts.
    pub fn parse(url: &str) -> Result<(LaneNumber, Option<RacePointer>)> {
        let query = url.split_once('?').map_or(url, |(_, query)| query);
        let query = query.split_once('#').map_or(query, |(query, _)| query);

        let (mut lane, mut event, mut heat) = (None, None, None);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "lane" => lane = Some(value.into_owned()),
                "event" => event = Some(value.into_owned()),
                "heat" => heat = Some(value.into_owned()),
                _ => {},
            }
        }

        let lane = LaneNumber::parse(&lane.ok_or(ProtocolError::MissingField("lane"))?)?;
        let pointer = RacePointer::from_parts(
            event.as_deref().and_then(Identifier::parse_present),
            heat.as_deref().and_then(Identifier::parse_present),
        );
        Ok((lane, pointer))
    }

    /// Links for lanes `1..=max_lanes`.
    pub fn for_race(base: &str, max_lanes: u8, pointer: &RacePointer) -> Vec<Self> {
        (1..=max_lanes)
            .filter_map(LaneNumber::new)
            .map(|lane| Self::build(base, lane, pointer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_encodes_lane_and_race() {
        let link = LaneLink::build(
            "http://timing.local/",
            LaneNumber::new(3).unwrap(),
            &RacePointer::new("12", "B 2"),
        );
        insta::assert_snapshot!(link.url, @"http://timing.local/?lane=3&event=12&heat=B+2");
    }

    #[test]
    fn one_link_per_lane() {
        let links = LaneLink::for_race("http://t/?venue=a", 8, &RacePointer::new("1", "1"));
        assert_eq!(links.len(), 8);
        assert_eq!(links[7].url, "http://t/?venue=a&lane=8&event=1&heat=1");
    }

    #[test]
    fn built_links_open_their_lane_and_race() {
        let race = RacePointer::new("12", "B 2");
        for link in LaneLink::for_race("http://t/?venue=a&lane=9", 8, &race) {
            assert_eq!(LaneLink::parse(&link.url), Ok((link.lane, Some(race.clone()))));
        }
    }

    #[test]
    fn link_without_race_opens_lane_only() {
        let (lane, pointer) = LaneLink::parse("http://t/?lane=2&event=5#top").unwrap();
        assert_eq!(lane.get(), 2);
        assert_eq!(pointer, None);
        assert_eq!(
            LaneLink::parse("lane=4&event=1&heat=3").unwrap().1,
            Some(RacePointer::new("1", "3"))
        );
    }

    #[test]
    fn link_without_lane_is_rejected() {
        assert_eq!(
            LaneLink::parse("http://t/?event=1&heat=1"),
            Err(ProtocolError::MissingField("lane"))
        );
        assert!(matches!(
            LaneLink::parse("http://t/?lane=0"),
            Err(ProtocolError::InvalidLane(_))
        ));
    }
}
