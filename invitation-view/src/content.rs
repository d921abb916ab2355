use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Utc};
use once_cell::sync::Lazy;
use wedding_shared::models::WishStatus;

/// WIB, the event's local time zone (UTC+7).
pub const WIB_OFFSET_SECS: i32 = 7 * 3600;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";
const INSTAGRAM_URL: &str = "https://instagram.com/";

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: &'static str,
    pub short: &'static str,
    pub image: &'static str,
    pub instagram: &'static str,
    pub parents: &'static str,
}

impl Person {
    pub fn instagram_url(&self) -> String {
        format!("{}{}", INSTAGRAM_URL, self.instagram.trim_start_matches('@'))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub title: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    pub location_name: &'static str,
    pub location_address: &'static str,
}

impl Event {
    /// Google Maps search link for the event address
    pub fn maps_url(&self) -> String {
        format!(
            "{}{}",
            MAPS_SEARCH_URL,
            urlencoding::encode(self.location_address)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GiftAccount {
    pub bank_name: &'static str,
    pub account_name: &'static str,
    pub account_number: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub icon: &'static str,
    pub label: &'static str,
    pub target: &'static str,
}

const NAV_ITEMS: [NavItem; 5] = [
    NavItem { icon: "home", label: "Beranda", target: "home" },
    NavItem { icon: "favorite", label: "Mempelai", target: "couple" },
    NavItem { icon: "event", label: "Acara", target: "event" },
    NavItem { icon: "image", label: "Galeri", target: "gallery" },
    NavItem { icon: "chat_bubble", label: "Ucapan", target: "wishes" },
];

#[derive(Debug, Clone)]
pub struct InvitationContent {
    pub couple_short: &'static str,
    pub couple_long: &'static str,
    pub song: &'static str,
    pub wedding_at: DateTime<FixedOffset>,
    pub bride: Person,
    pub groom: Person,
    pub ceremony: Event,
    pub reception: Event,
    pub gallery: Vec<&'static str>,
    pub gifts: Vec<GiftAccount>,
}

impl InvitationContent {
    pub fn has_gallery(&self) -> bool {
        !self.gallery.is_empty()
    }

    /// Bottom navigation. The gallery entry only shows when there are photos.
    pub fn nav_items(&self) -> Vec<NavItem> {
        NAV_ITEMS
            .iter()
            .filter(|item| item.target != "gallery" || self.has_gallery())
            .cloned()
            .collect()
    }
}

pub static INVITATION: Lazy<InvitationContent> = Lazy::new(|| {
    let wib = FixedOffset::east_opt(WIB_OFFSET_SECS).expect("WIB offset is in range");
    let wedding_at = wib
        .with_ymd_and_hms(2026, 3, 22, 10, 0, 0)
        .single()
        .expect("wedding instant is unambiguous");

    InvitationContent {
        couple_short: "Lifia & Yusuf",
        couple_long: "Lifiatus shalekha & Moh. Yusuf Efendi",
        song: "/andmesh.mp3",
        wedding_at,
        bride: Person {
            name: "Lifiatus shalekha",
            short: "Lifia",
            image: "/wanita.webp",
            instagram: "@lifiash57",
            parents: "Putri dari Bapak Darno (alm) & Ibu Marfuah (alm)",
        },
        groom: Person {
            name: "Moh. Yusuf Efendi",
            short: "Yusuf",
            image: "/pria.webp",
            instagram: "@yusuf_efendi_46",
            parents: "Putra dari Bapak H khasan & Ibu Hj Masriah",
        },
        ceremony: Event {
            title: "Akad Nikah",
            date: "Rabu, 22 Maret 2026",
            time: "08:00 - 10:00 WIB",
            location_name: "Rumah mempelai putri",
            location_address: "Rt 05 Rw 01, ds karang wungu, kec karang geneng kab Lamongan",
        },
        reception: Event {
            title: "Resepsi",
            date: "Rabu, 22 Maret 2026",
            time: "12:00 - 14:00 WIB",
            location_name: "Rumah mempelai putri",
            location_address: "Rt 05 Rw 01, ds karang wungu, kec karang geneng kab Lamongan",
        },
        gallery: Vec::new(),
        gifts: vec![GiftAccount {
            bank_name: "BCA",
            account_name: "Lifiatus Shalekha",
            account_number: "3301115588",
        }],
    }
});

/// Indonesian label shown on a wish card
pub fn status_label(status: WishStatus) -> &'static str {
    match status {
        WishStatus::Going => "Hadir",
        WishStatus::Maybe => "Mungkin Hadir",
        WishStatus::NotGoing => "Tidak Bisa Hadir",
    }
}

/// Long Indonesian date in WIB, e.g. `22 Maret 2026`.
pub fn format_wish_date(at: DateTime<Utc>) -> String {
    let local = match FixedOffset::east_opt(WIB_OFFSET_SECS) {
        Some(wib) => at.with_timezone(&wib).date_naive(),
        None => at.date_naive(),
    };
    format!(
        "{} {} {}",
        local.day(),
        MONTHS_ID[local.month0() as usize],
        local.year()
    )
}

/// Guest name from the invitation link's `to` query parameter.
pub fn guest_name_from_query(query: &str) -> Option<String> {
    let query = query.split_once('?').map_or(query, |(_, q)| q);
    let query = query.split('#').next().unwrap_or_default();

    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == "to")
        .and_then(|(_, value)| {
            let value = value.replace('+', " ");
            urlencoding::decode(&value).ok().map(|v| v.trim().to_string())
        })
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedding_instant_is_wib() {
        assert_eq!(
            INVITATION.wedding_at.to_rfc3339(),
            "2026-03-22T10:00:00+07:00"
        );
    }

    #[test]
    fn maps_url_encodes_address() {
        assert_eq!(
            INVITATION.ceremony.maps_url(),
            "https://www.google.com/maps/search/?api=1&query=Rt%2005%20Rw%2001%2C%20ds%20karang%20wungu%2C%20kec%20karang%20geneng%20kab%20Lamongan"
        );
    }

    #[test]
    fn instagram_url_drops_at_sign() {
        assert_eq!(
            INVITATION.bride.instagram_url(),
            "https://instagram.com/lifiash57"
        );
    }

    #[test]
    fn nav_skips_empty_gallery() {
        let targets: Vec<&str> = INVITATION.nav_items().iter().map(|i| i.target).collect();
        assert_eq!(targets, vec!["home", "couple", "event", "wishes"]);

        let mut with_photos = INVITATION.clone();
        with_photos.gallery.push("https://picsum.photos/seed/wed1/600/600");
        assert_eq!(with_photos.nav_items().len(), 5);
    }

    #[test]
    fn wish_dates_render_in_wib() {
        let late_utc = Utc.with_ymd_and_hms(2026, 2, 28, 20, 0, 0).unwrap();
        assert_eq!(format_wish_date(late_utc), "1 Maret 2026");
    }

    #[test]
    fn guest_name_parsing() {
        assert_eq!(
            guest_name_from_query("?to=Budi%20Santoso"),
            Some("Budi Santoso".to_string())
        );
        assert_eq!(
            guest_name_from_query("https://undangan.id/?utm=wa&to=Ibu+Sari#wishes"),
            Some("Ibu Sari".to_string())
        );
        assert_eq!(guest_name_from_query("?to="), None);
        assert_eq!(guest_name_from_query(""), None);
        assert_eq!(guest_name_from_query("?from=x"), None);
    }

    #[test]
    fn status_labels() {
        assert_eq!(status_label(WishStatus::NotGoing), "Tidak Bisa Hadir");
    }
}
