use uuid::Uuid;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Dashboard page. Interaction events go to the server one at a time; each
/// response is a complete figure applied with a single `Plotly.react`, so
/// both traces always change together.
const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Linked selection</title>
    <script src="{{PLOTLY}}"></script>
    <style>
        html, body { margin: 0; padding: 0; font-family: Questrial, sans-serif; }
        #graph { width: 100%; }
    </style>
</head>
<body>
    <div id="graph"></div>
    <script>
        const SESSION = "{{SESSION}}";
        const SCATTER = 0;
        const PARCATS = 1;
        const gd = document.getElementById("graph");
        const initial = {{FIGURE}};
        Plotly.newPlot(gd, initial.data, initial.layout);

        let queue = Promise.resolve();
        function send(payload) {
            queue = queue
                .then(() => fetch("/_dash/event?session=" + SESSION, {
                    method: "POST",
                    headers: { "Content-Type": "application/json" },
                    body: JSON.stringify(payload),
                }))
                .then((resp) => {
                    // Session evicted or server restarted: start a new one.
                    if (resp.status === 404) { window.location.reload(); return null; }
                    return resp.ok || resp.status === 422 ? resp.json() : null;
                })
                .then((fig) => { if (fig) { return Plotly.react(gd, fig.data, fig.layout); } })
                .catch((err) => console.error(err));
        }

        gd.on("plotly_selected", (ev) => {
            const points = ev ? ev.points.filter((p) => p.curveNumber === SCATTER) : null;
            send({
                trigger: "selectedData",
                selectedData: points ? { points: points.map((p) => ({ pointIndex: p.pointIndex })) } : null,
            });
        });
        gd.on("plotly_deselect", () => send({ trigger: "selectedData", selectedData: null }));
        gd.on("plotly_click", (ev) => {
            const points = ev ? ev.points.filter((p) => p.curveNumber === PARCATS) : [];
            if (points.length === 0) { return; }
            send({
                trigger: "clickData",
                clickData: { points: points.map((p) => ({ pointNumber: p.pointNumber })) },
            });
        });
    </script>
</body>
</html>
"#;

/// Render the page for one session with its initial figure inlined.
pub fn render_page(session: &Uuid, figure_json: &str) -> String {
    TEMPLATE
        .replace("{{PLOTLY}}", PLOTLY_CDN)
        .replace("{{SESSION}}", &session.to_string())
        .replace("{{FIGURE}}", &escape_script(figure_json))
}

/// Keep data strings from closing the inline `<script>`.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}
