//! In-memory calendar service used by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use feedcal_gdata::atom::{self, ATOM_NS, Element, OPENSEARCH_NS};
use feedcal_gdata::link::{Link, REL_EDIT, REL_SELF};
use feedcal_gdata::{
    CalendarClient, ClientConfig, Entry, FeedResult, HttpRequest, HttpResponse, Method,
    Transport,
};
use url::Url;

pub const BASE: &str = "https://calendar.test/feeds";
pub const LOGIN_URL: &str = "https://calendar.test/accounts/ClientLogin";
pub const USER: &str = "jo@example.com";
pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "tok-123";
pub const FEED_PATH: &str = "/feeds/jo@example.com/private/full";

#[derive(Debug, Default)]
struct State {
    entries: Vec<Entry>,
    next_id: u32,
    requests: Vec<HttpRequest>,
    /// Session id handed out on the first write, if any.
    session: Option<String>,
}

/// A fake calendar service speaking the feed protocol.
#[derive(Debug, Default)]
pub struct FakeCalendar {
    state: Mutex<State>,
}

impl FakeCalendar {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes writes without the given session id redirect to one that has it.
    pub fn with_session(session: &str) -> Arc<Self> {
        let fake = Self::default();
        fake.state.lock().unwrap().session = Some(session.to_string());
        Arc::new(fake)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn stored(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    fn feed_url() -> String {
        format!("https://calendar.test{}", FEED_PATH)
    }

    fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if request.url.as_str() == LOGIN_URL {
            return login(request);
        }

        let method = match request.header("X-HTTP-Method-Override") {
            Some("PUT") => Method::Put,
            Some("DELETE") => Method::Delete,
            _ => request.method,
        };

        if method != Method::Get {
            let expected = format!("GoogleLogin auth={}", TOKEN);
            if request.header("Authorization") != Some(expected.as_str()) {
                return HttpResponse::new(401, "Unauthorized", "Token invalid");
            }
            if let Some(ref session) = state.session {
                let current = request
                    .url
                    .query_pairs()
                    .find(|(k, _)| k == "gsessionid")
                    .map(|(_, v)| v.into_owned());
                if current.as_deref() != Some(session.as_str()) {
                    let mut location = request.url.clone();
                    location.query_pairs_mut().append_pair("gsessionid", session);
                    return HttpResponse::new(302, "Moved Temporarily", "")
                        .with_header("Location", location.as_str());
                }
            }
        }

        let path = request.url.path().to_string();
        match method {
            Method::Get if path == FEED_PATH => feed(&state.entries),
            Method::Get => match find(&state.entries, |e| e.self_url(), &path) {
                Some(i) => xml_response(200, "OK", state.entries[i].element()),
                None => HttpResponse::new(404, "Not Found", "No such entry"),
            },
            Method::Post if path == FEED_PATH => {
                let Some(mut entry) = parse_body(request) else {
                    return HttpResponse::new(400, "Bad Request", "Invalid entry");
                };
                state.next_id += 1;
                let id = format!("{}/e{}", Self::feed_url(), state.next_id);
                let root = entry.element_mut();
                root.remove_children(ATOM_NS, "id");
                root.set_child_text(ATOM_NS, "id", id.as_str());
                set_links(&mut entry, &id, 1);
                let response = xml_response(201, "Created", entry.element());
                state.entries.push(entry);
                response
            }
            Method::Put => {
                let Some(i) = find(&state.entries, |e| e.edit_url(), &path) else {
                    return HttpResponse::new(409, "Conflict", "Version mismatch");
                };
                let Some(mut entry) = parse_body(request) else {
                    return HttpResponse::new(400, "Bad Request", "Invalid entry");
                };
                let id = state.entries[i].id().unwrap_or_default();
                let version = path
                    .rsplit('/')
                    .next()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(1);
                entry.element_mut().set_child_text(ATOM_NS, "id", id.as_str());
                set_links(&mut entry, &id, version + 1);
                let response = xml_response(200, "OK", entry.element());
                state.entries[i] = entry;
                response
            }
            Method::Delete => match find(&state.entries, |e| e.edit_url(), &path) {
                Some(i) => {
                    state.entries.remove(i);
                    HttpResponse::new(200, "OK", "")
                }
                None => HttpResponse::new(404, "Not Found", "No such entry"),
            },
            Method::Post => HttpResponse::new(405, "Method Not Allowed", ""),
        }
    }
}

impl Transport for FakeCalendar {
    fn send(&self, request: &HttpRequest) -> FeedResult<HttpResponse> {
        Ok(self.handle(request))
    }
}

fn login(request: &HttpRequest) -> HttpResponse {
    let form: Vec<(String, String)> = url::form_urlencoded::parse(
        request.body.as_deref().unwrap_or_default().as_bytes(),
    )
    .into_owned()
    .collect();
    let field = |name: &str| {
        form.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    };
    if field("Email") == Some(USER) && field("Passwd") == Some(PASSWORD) {
        HttpResponse::new(200, "OK", format!("SID=s\nLSID=l\nAuth={}\n", TOKEN))
    } else {
        HttpResponse::new(403, "Forbidden", "Error=BadAuthentication\n")
    }
}

fn parse_body(request: &HttpRequest) -> Option<Entry> {
    Entry::parse(request.body.as_deref()?).ok()
}

fn set_links(entry: &mut Entry, id: &str, version: u32) {
    entry.element_mut().remove_children(ATOM_NS, "link");
    entry.add_link(&Link::new(REL_SELF, id));
    entry.add_link(&Link::new(REL_EDIT, format!("{}/{}", id, version)));
}

fn find(entries: &[Entry], url_of: impl Fn(&Entry) -> Option<String>, path: &str) -> Option<usize> {
    entries.iter().position(|e| {
        url_of(e)
            .and_then(|u| Url::parse(&u).ok())
            .is_some_and(|u| u.path() == path)
    })
}

fn feed(entries: &[Entry]) -> HttpResponse {
    let mut root = Element::new(ATOM_NS, "feed");
    root.set_child_text(ATOM_NS, "title", "Jo");
    root.set_child_text(OPENSEARCH_NS, "totalResults", entries.len().to_string());
    for entry in entries {
        root.push_child(entry.element().clone());
    }
    xml_response(200, "OK", &root)
}

fn xml_response(status: u16, reason: &str, root: &Element) -> HttpResponse {
    match atom::to_xml(root) {
        Ok(body) => HttpResponse::new(status, reason, body)
            .with_header("Content-Type", "application/atom+xml; charset=UTF-8"),
        Err(e) => HttpResponse::new(500, "Internal Server Error", e.to_string()),
    }
}

/// A client wired to the fake service.
pub fn client(fake: &Arc<FakeCalendar>, config: ClientConfig) -> CalendarClient {
    let config = config.with_feeds_base(BASE).with_login_url(LOGIN_URL);
    CalendarClient::with_transport(config, fake.clone()).unwrap()
}

/// A logged-in client wired to the fake service.
pub fn logged_in(fake: &Arc<FakeCalendar>, config: ClientConfig) -> CalendarClient {
    let mut client = client(fake, config);
    client.login(USER, PASSWORD).unwrap();
    client
}
