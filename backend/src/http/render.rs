// Admin page rendering.

use std::fmt::Write;

use machine_core::discovery::DeviceCandidate;
use machine_core::settings::Settings;
use machine_core::timing::DerivedTimings;

use crate::store::LiveWarnings;
use crate::utils::escape_html;

pub struct AdminPage<'a> {
    pub settings: &'a Settings,
    pub warnings: &'a LiveWarnings,
    pub devices: &'a [DeviceCandidate],
}

impl AdminPage<'_> {
    pub fn render(&self) -> String {
        let machine = &self.settings.machine;
        let scoreboard = &self.settings.scoreboard;
        let endpoint = &scoreboard.endpoint;
        let timings = DerivedTimings::from_waiting_secs(machine.waiting_time);

        let mut html = String::with_capacity(4096);
        html.push_str(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>Dart machine admin</title>\n\
             <link rel=\"stylesheet\" href=\"/static/admin.css\">\n</head>\n<body>\n\
             <main class=\"container\">\n<h1>Dart machine admin</h1>\n",
        );

        html.push_str("<section class=\"card\">\n<h2>Machine</h2>\n");
        push_warnings(&mut html, &self.warnings.machine);
        html.push_str("<form method=\"post\" action=\"/updateMachine\">\n");
        let _ = write!(
            html,
            "<label for=\"delay\">Waiting time (seconds)</label>\n\
             <input id=\"delay\" name=\"delay\" type=\"number\" min=\"0\" value=\"{}\">\n\
             <p class=\"hint\">Debounce after third dart: {} seconds</p>\n\
             <label for=\"thresh\">Piezo threshold</label>\n\
             <input id=\"thresh\" name=\"thresh\" type=\"number\" value=\"{}\">\n\
             <label for=\"serial\">Serial device (current: {})</label>\n\
             <select id=\"serial\" name=\"serial\">\n",
            machine.waiting_time,
            timings.debounce().as_secs(),
            machine.piezo_threshold,
            escape_html(&machine.serial_device),
        );
        for device in self.devices {
            let value = escape_html(device.as_str());
            let selected = if device.as_str() == machine.serial_device {
                " selected"
            } else {
                ""
            };
            let _ = writeln!(html, "<option value=\"{value}\"{selected}>{value}</option>");
        }
        html.push_str("</select>\n<button type=\"submit\">Save machine settings</button>\n</form>\n</section>\n");

        html.push_str("<section class=\"card\">\n<h2>Scoreboard</h2>\n");
        if !scoreboard.is_reachable() {
            let _ = writeln!(
                html,
                "<p class=\"error\">Connection check failed: {}</p>",
                escape_html(&scoreboard.last_error)
            );
        }
        push_warnings(&mut html, &self.warnings.scoreboard);
        let checked = if endpoint.https { " checked" } else { "" };
        let _ = write!(
            html,
            "<form method=\"post\" action=\"/updateScoreboard\">\n\
             <label><input name=\"sbprot\" type=\"checkbox\"{checked}> Use HTTPS</label>\n\
             <label for=\"sbhost\">Host</label>\n\
             <input id=\"sbhost\" name=\"sbhost\" value=\"{}\">\n\
             <label for=\"sbport\">Port</label>\n\
             <input id=\"sbport\" name=\"sbport\" value=\"{}\">\n\
             <label for=\"sbgame\">Game ID</label>\n\
             <input id=\"sbgame\" name=\"sbgame\" value=\"{}\">\n\
             <label for=\"sbuser\">User</label>\n\
             <input id=\"sbuser\" name=\"sbuser\" value=\"{}\">\n\
             <label for=\"sbpass\">Password</label>\n\
             <input id=\"sbpass\" name=\"sbpass\" type=\"password\" value=\"{}\">\n\
             <button type=\"submit\">Save scoreboard settings</button>\n</form>\n</section>\n",
            escape_html(&endpoint.host),
            escape_html(&endpoint.port),
            escape_html(&endpoint.game_id),
            escape_html(&endpoint.user),
            escape_html(&endpoint.pass),
        );

        html.push_str("</main>\n</body>\n</html>\n");
        html
    }
}

fn push_warnings(html: &mut String, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    html.push_str("<ul class=\"warnings\">\n");
    for warning in warnings {
        let _ = writeln!(html, "<li>{}</li>", escape_html(warning));
    }
    html.push_str("</ul>\n");
}
