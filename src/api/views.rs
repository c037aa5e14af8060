//! Inline HTML views. Every dynamic value is escaped before it is written.

use crate::{
    types::{Playlist, TrackRow},
    utils::{self, escape_html},
};

/// Form value that selects the user's saved tracks instead of a playlist.
pub const LIKED_SONGS: &str = "liked";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset='utf-8'><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

pub fn index_page() -> String {
    layout(
        "Song Swiper",
        "<h1>Welcome to Song Swiper!</h1>\n<a href='/login'><button>Login</button></a>",
    )
}

pub fn dashboard_page(name: &str) -> String {
    let body = format!(
        "<h1>Welcome, {}!</h1>\n\
         <a href='/select_playlist'><button>Select playlist</button></a>\n\
         <br><a href='/logout'><button>Logout</button></a>",
        escape_html(name)
    );
    layout("Dashboard", &body)
}

pub fn playlist_form(playlists: &[Playlist]) -> String {
    let mut body = String::from(
        "<h1>Select a playlist</h1>\n<form method='POST' action='/select_playlist'>\n",
    );
    body.push_str(&format!(
        "<input type='radio' name='playlist_id' value='{}' required> Liked Songs<br>\n",
        LIKED_SONGS
    ));
    for playlist in playlists {
        body.push_str(&format!(
            "<input type='radio' name='playlist_id' value='{}' required> {}<br>\n",
            escape_html(&playlist.id),
            escape_html(&playlist.name)
        ));
    }
    body.push_str("<br><button type='submit'>Start swiping</button></form>\n");
    body.push_str("<br><a href='/dashboard'><button>Back to dashboard</button></a>");
    layout("Select a playlist", &body)
}

pub fn track_list_page(playlist_name: &str, tracks: &[TrackRow]) -> String {
    let mut list = String::from("<ol style='line-height: 1.8;'>\n");
    for track in tracks {
        list.push_str(&format!(
            "<li>{}  |  {}  |  {}</li>\n",
            escape_html(&track.name),
            escape_html(&track.album_name),
            escape_html(&utils::join_artist_names(&track.artist_names))
        ));
    }
    list.push_str("</ol>");

    let body = format!(
        "<h1>Playlist: {}</h1>\n{}\n\
         <br><a href='/select_playlist'><button>Choose another playlist</button></a>\n\
         <br><a href='/dashboard'><button>Back to dashboard</button></a>",
        escape_html(playlist_name),
        list
    );
    layout(playlist_name, &body)
}

pub fn error_page(title: &str, message: &str, offer_login: bool) -> String {
    let mut body = format!(
        "<h4>{}</h4>\n<p>{}</p>\n",
        escape_html(title),
        escape_html(message)
    );
    if offer_login {
        body.push_str("<a href='/login'><button>Login</button></a>\n");
    }
    body.push_str("<br><a href='/'><button>Home</button></a>");
    layout(title, &body)
}
