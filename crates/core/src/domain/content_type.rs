// Content Type Registry
// Built-in content types and the field definitions the admin editor renders

use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Editor widget / validation class of a field definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Richtext,
    Email,
    Url,
    Number,
    Date,
    Boolean,
    Image,
    Gallery,
    Select,
    Array,
    Object,
    Reference,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_fields: Vec<FieldDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldDefinition {
    fn new(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label,
            field_type,
            required: false,
            placeholder: None,
            help_text: None,
            default_value: None,
            options: Vec::new(),
            item_fields: Vec::new(),
            reference_type: None,
            validation: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = Some(text);
        self
    }

    fn help(mut self, text: &'static str) -> Self {
        self.help_text = Some(text);
        self
    }

    fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    fn options(mut self, options: &[&'static str]) -> Self {
        self.options = options.to_vec();
        self
    }

    fn items(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.item_fields = fields;
        self
    }

    fn references(mut self, content_type: &'static str) -> Self {
        self.reference_type = Some(content_type);
        self
    }

    fn range(mut self, min: f64, max: f64) -> Self {
        self.validation = Some(FieldValidation {
            min: Some(min),
            max: Some(max),
            pattern: None,
        });
        self
    }

    /// Validate one value against this definition
    ///
    /// Emptiness follows loose truthiness: missing, null, "", false and 0 all
    /// count as empty for required fields. Range checks only apply to numbers.
    pub fn validate(&self, value: Option<&Value>) -> Option<String> {
        if self.required && is_empty(value) {
            return Some(format!("{} is required", self.label));
        }

        if self.field_type == FieldType::Number {
            if let (Some(number), Some(rules)) =
                (value.and_then(Value::as_f64), self.validation.as_ref())
            {
                if let Some(min) = rules.min {
                    if number < min {
                        return Some(format!("{} must be at least {}", self.label, min));
                    }
                }
                if let Some(max) = rules.max {
                    if number > max {
                        return Some(format!("{} must be at most {}", self.label, max));
                    }
                }
            }
        }

        None
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// A content type and its editor schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeDefinition {
    pub name: &'static str,
    pub label: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub show_in_nav: bool,
    pub fields: Vec<FieldDefinition>,
}

impl ContentTypeDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Validate a single value (free function form used by callers holding a definition)
pub fn validate_field(value: Option<&Value>, field: &FieldDefinition) -> Option<String> {
    field.validate(value)
}

/// All built-in content types, in navigation order
pub fn content_types() -> &'static [ContentTypeDefinition] {
    static REGISTRY: OnceLock<Vec<ContentTypeDefinition>> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

pub fn content_type(name: &str) -> Option<&'static ContentTypeDefinition> {
    content_types().iter().find(|ct| ct.name == name)
}

pub fn nav_content_types() -> Vec<&'static ContentTypeDefinition> {
    content_types().iter().filter(|ct| ct.show_in_nav).collect()
}

fn build_registry() -> Vec<ContentTypeDefinition> {
    use serde_json::json;
    use FieldType::*;

    let f = FieldDefinition::new;
    let tags = || f("tags", "Tags", Array).items(vec![f("tag", "Tag", Text)]);

    vec![
        ContentTypeDefinition {
            name: "homepage",
            label: "Homepage",
            singular: "Homepage",
            plural: "Homepage",
            icon: "Home",
            description: "Manage homepage content and sections",
            show_in_nav: true,
            fields: vec![
                // Hero
                f("hero_title", "Hero Title", Text).required().placeholder("Main headline"),
                f("hero_subtitle", "Hero Subtitle", Textarea).placeholder("Supporting text"),
                f("hero_cta_text", "Hero CTA Button Text", Text).placeholder("e.g., Get Started"),
                f("hero_cta_link", "Hero CTA Link", Url).placeholder("Button destination URL"),
                f("hero_background", "Hero Background Image", Image),
                // About
                f("about_heading", "About Section Heading", Text),
                f("about_description", "About Description", Richtext),
                f("about_images", "About Images", Gallery),
                // Services
                f("services_heading", "Services Heading", Text),
                f("services_description", "Services Description", Textarea),
                // Stats
                f("stats_auto_calculate", "Auto-calculate Statistics", Boolean)
                    .default_value(json!(true))
                    .help("Automatically calculate from team, clients, projects data"),
                // Testimonials
                f("testimonials", "Testimonials", Array).items(vec![
                    f("name", "Client Name", Text).required(),
                    f("company", "Company", Text),
                    f("quote", "Quote", Textarea).required(),
                    f("avatar", "Avatar Image", Image),
                ]),
                // CTA
                f("cta_heading", "CTA Section Heading", Text),
                f("cta_description", "CTA Description", Textarea),
                f("cta_button_text", "CTA Button Text", Text),
                f("cta_button_link", "CTA Button Link", Url),
                // Partners
                f("partners_logos", "Partner/Client Logos", Gallery),
            ],
        },
        ContentTypeDefinition {
            name: "portfolio",
            label: "Portfolio",
            singular: "Portfolio Item",
            plural: "Portfolio Items",
            icon: "Briefcase",
            description: "Showcase your work and projects",
            show_in_nav: true,
            fields: vec![
                f("title", "Project Title", Text).required(),
                f("category", "Category", Select).required().options(&[
                    "Facade & Cladding",
                    "Structural Elements",
                    "Art Installation & Sculpture",
                    "Partition & Screen",
                    "Stairway & Railing",
                    "Light Fixture & Signage",
                    "Furniture & Accessories",
                    "Doors & Windows",
                ]),
                f("description", "Description", Richtext).required(),
                f("location", "Project Location", Text).placeholder("City, Country"),
                f("year", "Project Year", Number).range(1900.0, 2100.0),
                f("client_name", "Client Name", Text),
                tags(),
            ],
        },
        ContentTypeDefinition {
            name: "services",
            label: "Services",
            singular: "Service",
            plural: "Services",
            icon: "Wrench",
            description: "Manage your service offerings",
            show_in_nav: true,
            fields: vec![
                f("service_name", "Service Name", Text).required(),
                f("description", "Description", Richtext).required(),
                f("icon_image", "Icon/Image", Image),
                f("order", "Display Order", Number)
                    .default_value(json!(0))
                    .help("Lower numbers appear first"),
                f("featured_homepage", "Featured on Homepage", Boolean)
                    .default_value(json!(false)),
            ],
        },
        ContentTypeDefinition {
            name: "team",
            label: "Team",
            singular: "Team Member",
            plural: "Team Members",
            icon: "Users",
            description: "Manage team members",
            show_in_nav: true,
            fields: vec![
                f("name", "Full Name", Text).required(),
                f("position", "Position/Role", Text).required(),
                f("bio", "Biography", Richtext),
                f("email", "Email", Email),
                f("linkedin", "LinkedIn Profile URL", Url),
                f("join_date", "Join Date", Date),
                f("location", "Location/Office", Text).placeholder("e.g., Kochi, Kerala"),
            ],
        },
        ContentTypeDefinition {
            name: "projects",
            label: "Projects",
            singular: "Project",
            plural: "Projects",
            icon: "FolderOpen",
            description: "Track all projects",
            show_in_nav: true,
            fields: vec![
                f("project_name", "Project Name", Text).required(),
                f("client", "Client", Reference).references("clients"),
                f("location", "Location (City)", Text)
                    .required()
                    .placeholder("City name for statistics"),
                f("start_date", "Start Date", Date),
                f("end_date", "End Date", Date),
                f("status", "Status", Select)
                    .options(&["completed", "ongoing", "upcoming"])
                    .default_value(json!("ongoing")),
                f("portfolio_items", "Portfolio Items", Reference)
                    .references("portfolio")
                    .help("Link portfolio items to this project"),
                f("value", "Project Value/Budget", Text).placeholder("Optional"),
            ],
        },
        ContentTypeDefinition {
            name: "clients",
            label: "Clients",
            singular: "Client",
            plural: "Clients",
            icon: "Building",
            description: "Manage client companies",
            show_in_nav: true,
            fields: vec![
                f("company_name", "Company Name", Text).required(),
                f("website", "Website", Url),
                f("first_project_date", "First Project Date", Date),
            ],
        },
        ContentTypeDefinition {
            name: "testimonials",
            label: "Testimonials",
            singular: "Testimonial",
            plural: "Testimonials",
            icon: "MessageSquare",
            description: "Client testimonials and reviews",
            show_in_nav: true,
            fields: vec![
                f("client_name", "Client Name", Text).required(),
                f("company", "Company", Text),
                f("position", "Position/Title", Text),
                f("quote", "Testimonial Quote", Textarea).required(),
                f("rating", "Rating", Number)
                    .range(1.0, 5.0)
                    .default_value(json!(5)),
                f("featured_homepage", "Featured on Homepage", Boolean)
                    .default_value(json!(false)),
                f("project_reference", "Related Project", Reference).references("projects"),
            ],
        },
        ContentTypeDefinition {
            name: "blogs",
            label: "Blogs",
            singular: "Blog Post",
            plural: "Blog Posts",
            icon: "FileText",
            description: "Blog posts and articles",
            show_in_nav: true,
            fields: vec![
                f("title", "Post Title", Text).required(),
                f("content", "Content", Richtext).required(),
                f("excerpt", "Excerpt", Textarea).placeholder("Short description for listings"),
                f("author", "Author", Text),
                f("publish_date", "Publish Date", Date),
                tags(),
            ],
        },
    ]
}
