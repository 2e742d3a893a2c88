use rand::Rng;

/// Marker present in every canned response
pub const DEMO_MARKER: &str = "DEMO";

pub const MOCK_RESPONSES: [&str; 3] = [
    "**Main Subject**: The image features a vibrant outdoor scene with natural elements.

**Visual Elements**: The composition showcases rich colors with excellent lighting. The color palette includes warm tones that create an inviting atmosphere. The image demonstrates good depth of field and professional framing.

**Context & Setting**: This appears to be captured in a natural outdoor environment, possibly during golden hour. The setting suggests a peaceful, serene location with ample natural light.

**Notable Details**: The image exhibits sharp focus on the primary subject with a pleasing bokeh effect in the background. The exposure is well-balanced, capturing details in both highlights and shadows.

**Mood & Atmosphere**: The overall mood is uplifting and positive. The image conveys a sense of tranquility and natural beauty, evoking feelings of peace and harmony with nature.

*Note: This is a DEMO response. Configure your GEMINI_API_KEY for real AI analysis.*",
    "**Main Subject**: A captivating photograph showcasing interesting visual elements and composition.

**Visual Elements**: The image displays a harmonious blend of colors and textures. The lighting creates dynamic contrasts that draw the viewer's attention to key areas. The composition follows the rule of thirds, creating visual balance.

**Context & Setting**: The environment appears to be well-lit with natural or ambient lighting. The background complements the main subject without creating distractions.

**Notable Details**: Fine details are preserved throughout the image. The photographer has successfully captured the essence of the moment with technical precision. The color grading enhances the overall aesthetic appeal.

**Mood & Atmosphere**: The image emanates a professional quality with artistic sensibility. It creates an emotional connection through its visual storytelling, leaving a lasting impression on the viewer.

*Note: This is a DEMO response. Add your GEMINI_API_KEY to .env for actual AI-powered analysis.*",
    "**Main Subject**: An engaging visual composition that captures attention through its subject matter and presentation.

**Visual Elements**: The photograph demonstrates excellent use of light and shadow. Colors are vibrant yet natural, creating visual interest. The composition is well-structured with clear focal points.

**Context & Setting**: The scene is set in an environment that provides context to the subject. The background elements support the narrative without overwhelming the main focus.

**Notable Details**: Attention to detail is evident in the sharpness and clarity of the image. The photographer has skillfully managed depth of field to emphasize the subject while maintaining contextual information.

**Mood & Atmosphere**: The overall feeling is one of authenticity and genuine moment capture. The image successfully communicates its intended message through visual language.

*Note: This is a DEMO MODE response. For real AI analysis powered by Google Gemini, please add your API key to the .env file.*",
];

/// Picks one canned description uniformly at random.
pub fn generate_mock_analysis() -> &'static str {
    let idx = rand::rng().random_range(0..MOCK_RESPONSES.len());
    MOCK_RESPONSES[idx]
}
